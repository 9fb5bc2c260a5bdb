//! Blog routes: public reading plus admin authoring.
//!
//! Public lookups address posts by slug; admin CRUD uses document ids so a
//! slug can be edited without changing the post's identity. The read
//! endpoints serve only published posts unless the caller is an admin, who
//! sees drafts in the same listings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::{ListQuery, Stored, collections, to_fields};
use crate::error::{ApiError, Result};
use crate::middleware::{AuthUser, OptionalAuth, RequireAdmin};
use crate::models::BlogPost;
use crate::routes::{PagedResponse, Pagination};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{slug}", get(get_post))
        .route(
            "/posts/{id}",
            axum::routing::put(update_post).delete(delete_post),
        )
}

fn sees_drafts(caller: Option<&AuthUser>) -> bool {
    caller.is_some_and(|user| user.role.is_admin())
}

async fn list_posts(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PagedResponse<Stored<BlogPost>>>> {
    let mut query = ListQuery::new();
    if !sees_drafts(caller.as_ref()) {
        query = query.filter_eq("published", true);
    }
    let page = state
        .store()
        .query(collections::BLOG_POSTS, pagination.apply(query))
        .await?;

    let has_more = page.has_more;
    Ok(Json(PagedResponse::new(
        page.into_typed()?,
        &pagination,
        has_more,
    )))
}

async fn find_by_slug(state: &AppState, slug: &str) -> Result<Option<Stored<BlogPost>>> {
    let page = state
        .store()
        .query(
            collections::BLOG_POSTS,
            ListQuery::new().filter_eq("slug", slug).limit(1),
        )
        .await?;
    Ok(page.into_typed::<BlogPost>()?.into_iter().next())
}

async fn get_post(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<Json<Stored<BlogPost>>> {
    let post = find_by_slug(&state, &slug)
        .await?
        .filter(|p| p.record.published || sees_drafts(caller.as_ref()))
        .ok_or_else(|| ApiError::NotFound("Post".to_owned()))?;
    Ok(Json(post))
}

#[derive(Debug, Deserialize)]
struct PostRequest {
    title: String,
    slug: String,
    body: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    published: bool,
}

fn validate_post(body: &PostRequest) -> Result<()> {
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_owned()));
    }
    let slug_ok = !body.slug.is_empty()
        && body
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !slug_ok {
        return Err(ApiError::BadRequest(
            "Slug must be lowercase letters, digits, and hyphens".to_owned(),
        ));
    }
    Ok(())
}

async fn author_name(state: &AppState, author: &AuthUser) -> Result<String> {
    let doc = state
        .store()
        .get(collections::USERS, author.id.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_owned()))?;
    Ok(doc.into_typed::<crate::models::User>()?.record.name)
}

async fn create_post(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<PostRequest>,
) -> Result<(StatusCode, Json<Stored<BlogPost>>)> {
    validate_post(&body)?;

    if find_by_slug(&state, &body.slug).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "A post with slug '{}' already exists",
            body.slug
        )));
    }

    let post = BlogPost {
        title: body.title,
        slug: body.slug,
        body: body.body,
        author_id: admin.id.clone(),
        author_name: author_name(&state, &admin).await?,
        tags: body.tags,
        published: body.published,
    };
    let doc = state
        .store()
        .create(collections::BLOG_POSTS, None, to_fields(&post)?)
        .await?;

    let post: Stored<BlogPost> = doc.into_typed()?;
    tracing::info!(post_id = %post.id, slug = %post.record.slug, "blog post created");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
    Json(body): Json<PostRequest>,
) -> Result<Json<Stored<BlogPost>>> {
    validate_post(&body)?;

    // Slug stays unique when it moves to a different post
    if let Some(other) = find_by_slug(&state, &body.slug).await?
        && other.id != id
    {
        return Err(ApiError::Conflict(format!(
            "A post with slug '{}' already exists",
            body.slug
        )));
    }

    // Authorship is preserved across edits
    let patch = serde_json::json!({
        "title": body.title,
        "slug": body.slug,
        "body": body.body,
        "tags": body.tags,
        "published": body.published,
    });
    let doc = state
        .store()
        .update(collections::BLOG_POSTS, &id, patch)
        .await?;
    Ok(Json(doc.into_typed()?))
}

async fn delete_post(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if state.store().delete(collections::BLOG_POSTS, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Post".to_owned()))
    }
}

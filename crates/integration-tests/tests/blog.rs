//! Blog publishing: public reads by slug, admin CRUD, slug uniqueness.

use axum::http::StatusCode;
use serde_json::json;

use zinoshop_integration_tests::TestApp;

async fn create_post(
    app: &TestApp,
    admin: &str,
    slug: &str,
    published: bool,
) -> (StatusCode, serde_json::Value) {
    app.request(
        "POST",
        "/api/blog",
        Some(admin),
        Some(json!({
            "title": format!("Post {slug}"),
            "slug": slug,
            "body": "Lorem ipsum.",
            "tags": ["care-guide"],
            "published": published,
        })),
    )
    .await
}

#[tokio::test]
async fn test_public_sees_published_only() {
    let app = TestApp::new();
    let (admin, _) = app.register_admin("admin@example.com", "adminpass1").await;

    create_post(&app, &admin, "gold-care", true).await;
    create_post(&app, &admin, "draft-post", false).await;

    let (status, body) = app.request("GET", "/api/blog", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "gold-care");

    let (status, body) = app.request("GET", "/api/blog/gold-care", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Post gold-care");
    // Author is attributed by display name
    assert_eq!(body["author_name"], "Admin");

    let (status, _) = app.request("GET", "/api/blog/draft-post", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_sees_drafts() {
    let app = TestApp::new();
    let (admin, _) = app.register_admin("admin@example.com", "adminpass1").await;
    let (customer, _) = app.register("c@example.com", "passw0rd!", "C").await;

    create_post(&app, &admin, "gold-care", true).await;
    create_post(&app, &admin, "draft-post", false).await;

    // Admins get drafts in the same listing
    let (status, body) = app.request("GET", "/api/blog", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .request("GET", "/api/blog/draft-post", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["published"], false);

    // A signed-in customer is still a public reader
    let (_, body) = app.request("GET", "/api/blog", Some(&customer), None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .request("GET", "/api/blog/draft-post", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A bad token on an optionally-authenticated route is still rejected
    let (status, _) = app
        .request("GET", "/api/blog", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_slug_uniqueness_and_validation() {
    let app = TestApp::new();
    let (admin, _) = app.register_admin("admin@example.com", "adminpass1").await;

    let (status, _) = create_post(&app, &admin, "gold-care", true).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = create_post(&app, &admin, "gold-care", true).await;
    assert_eq!(status, StatusCode::CONFLICT);

    for bad_slug in ["", "Has Spaces", "UPPER", "under_score"] {
        let (status, _) = create_post(&app, &admin, bad_slug, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted slug {bad_slug:?}");
    }
}

#[tokio::test]
async fn test_update_and_delete() {
    let app = TestApp::new();
    let (admin, _) = app.register_admin("admin@example.com", "adminpass1").await;

    let (_, created) = create_post(&app, &admin, "gold-care", false).await;
    let id = created["id"].as_str().unwrap().to_owned();

    // Publishing via update makes the post visible
    let (status, updated) = app
        .request(
            "PUT",
            &format!("/api/blog/posts/{id}"),
            Some(&admin),
            Some(json!({
                "title": "Caring for gold",
                "slug": "gold-care",
                "body": "Updated body.",
                "published": true,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Caring for gold");
    // Authorship survives edits
    assert_eq!(updated["author_name"], "Admin");

    let (status, _) = app.request("GET", "/api/blog/gold-care", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request("DELETE", &format!("/api/blog/posts/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request("GET", "/api/blog/gold-care", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_authoring_requires_admin() {
    let app = TestApp::new();
    let (customer, _) = app.register("c@example.com", "passw0rd!", "C").await;

    let (status, _) = create_post(&app, &customer, "nope", true).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

//! Firestore REST v1 document store backend.
//!
//! All persistence is delegated to Firestore; this client covers exactly the
//! surface the services need: document CRUD with merge updates, and
//! `runQuery` structured queries for filtered/ordered/paginated lists.
//!
//! Queries that combine a filter with an `orderBy` need a composite index in
//! Firestore. When one is missing the API fails with `FAILED_PRECONDITION`;
//! we then re-run the query without the ordering clause and sort the fetched
//! page in memory, so a missing index degrades results instead of breaking
//! the endpoint.

mod token;
mod value;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde_json::{Value, json};

use crate::config::FirestoreConfig;
use crate::db::{
    Direction, Document, DocumentStore, FilterOp, ListQuery, Page, StoreError, compare_values,
};

pub use token::TokenProvider;

/// Production Firestore endpoint.
const FIRESTORE_HOST: &str = "https://firestore.googleapis.com";

/// Client for the Firestore REST v1 API.
pub struct FirestoreStore {
    client: reqwest::Client,
    /// Base URL of the database's `documents` resource.
    documents_url: String,
    /// OAuth token provider; `None` against the emulator.
    token: Option<TokenProvider>,
}

impl FirestoreStore {
    /// Create a client from configuration.
    ///
    /// With `emulator_host` set, requests go to the emulator unauthenticated.
    /// Otherwise a service account is required for OAuth access tokens.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` when credentials are missing or the
    /// service-account key is invalid.
    pub fn new(config: &FirestoreConfig) -> Result<Self, StoreError> {
        let (host, token) = match (&config.emulator_host, &config.service_account) {
            (Some(emulator), _) => (format!("http://{emulator}"), None),
            (None, Some(account)) => {
                (FIRESTORE_HOST.to_owned(), Some(TokenProvider::new(account)?))
            }
            (None, None) => {
                return Err(StoreError::Backend(
                    "Firestore requires a service account or an emulator host".to_owned(),
                ));
            }
        };

        let documents_url = format!(
            "{host}/v1/projects/{}/databases/(default)/documents",
            config.project_id
        );

        Ok(Self {
            client: reqwest::Client::new(),
            documents_url,
            token,
        })
    }

    /// Attach the bearer token when running against production.
    async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, StoreError> {
        match &self.token {
            Some(provider) => {
                let token = provider.access_token(&self.client).await?;
                Ok(request.bearer_auth(token.expose_secret()))
            }
            None => Ok(request),
        }
    }

    async fn run_query(
        &self,
        collection: &str,
        query: &ListQuery,
        with_order: bool,
    ) -> Result<Vec<Document>, StoreError> {
        let (parent, collection_id) = split_collection_path(&self.documents_url, collection);
        let body = json!({
            "structuredQuery": build_structured_query(&collection_id, query, with_order)
        });

        let request = self
            .authorize(self.client.post(format!("{parent}:runQuery")))
            .await?
            .json(&body);
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(response_error(status, &text));
        }

        let results: Vec<Value> = serde_json::from_str(&text)
            .map_err(|e| StoreError::DataCorruption(format!("bad runQuery response: {e}")))?;

        results
            .iter()
            .filter_map(|entry| entry.get("document"))
            .map(parse_document)
            .collect()
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        data: Value,
    ) -> Result<Document, StoreError> {
        let fields = encode_document_fields(&data)?;
        let mut request = self
            .client
            .post(format!("{}/{collection}", self.documents_url));
        if let Some(id) = id {
            request = request.query(&[("documentId", id)]);
        }

        let response = self
            .authorize(request)
            .await?
            .json(&json!({"fields": fields}))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status == reqwest::StatusCode::CONFLICT {
            return Err(StoreError::Conflict(format!(
                "document already exists in {collection}"
            )));
        }
        if !status.is_success() {
            return Err(response_error(status, &text));
        }

        parse_document(&parse_json(&text)?)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let request = self
            .client
            .get(format!("{}/{collection}/{id}", self.documents_url));
        let response = self.authorize(request).await?.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(response_error(status, &text));
        }

        Ok(Some(parse_document(&parse_json(&text)?)?))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Document, StoreError> {
        let fields = encode_document_fields(&patch)?;

        // Restrict the write to the patched fields so untouched fields survive
        let mut params: Vec<(&str, String)> = vec![("currentDocument.exists", "true".to_owned())];
        if let Some(map) = patch.as_object() {
            for key in map.keys() {
                params.push(("updateMask.fieldPaths", key.clone()));
            }
        }

        let request = self
            .client
            .patch(format!("{}/{collection}/{id}", self.documents_url))
            .query(&params);
        let response = self
            .authorize(request)
            .await?
            .json(&json!({"fields": fields}))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(response_error(status, &text));
        }

        parse_document(&parse_json(&text)?)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let request = self
            .client
            .delete(format!("{}/{collection}/{id}", self.documents_url))
            .query(&[("currentDocument.exists", "true")]);
        let response = self.authorize(request).await?.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            let text = response.text().await?;
            return Err(response_error(status, &text));
        }

        Ok(true)
    }

    async fn query(&self, collection: &str, query: ListQuery) -> Result<Page, StoreError> {
        // Fetch one extra row to detect whether a next page exists
        let mut documents = match self.run_query(collection, &query, true).await {
            Ok(documents) => documents,
            Err(StoreError::Backend(message))
                if query.order_by.is_some() && message.contains("FAILED_PRECONDITION") =>
            {
                // Missing composite index: drop the orderBy and sort the
                // fetched page ourselves
                tracing::warn!(
                    collection = %collection,
                    "composite index missing, sorting query results in memory"
                );
                let mut unordered = self.run_query(collection, &query, false).await?;
                if let Some(order) = &query.order_by {
                    unordered.sort_by(|a, b| {
                        let av = a.data.get(&order.field).unwrap_or(&Value::Null);
                        let bv = b.data.get(&order.field).unwrap_or(&Value::Null);
                        let ord = compare_values(av, bv);
                        match order.direction {
                            Direction::Ascending => ord,
                            Direction::Descending => ord.reverse(),
                        }
                    });
                }
                unordered
            }
            Err(other) => return Err(other),
        };

        let has_more = documents.len() > query.limit;
        documents.truncate(query.limit);

        Ok(Page {
            documents,
            has_more,
        })
    }
}

/// Build the `structuredQuery` body for a list query.
///
/// The query asks for `limit + 1` rows; the caller pops the sentinel row to
/// learn whether another page exists.
fn build_structured_query(collection_id: &str, query: &ListQuery, with_order: bool) -> Value {
    let mut structured = json!({
        "from": [{"collectionId": collection_id}],
        "offset": query.offset,
        "limit": query.limit + 1,
    });

    let field_filters: Vec<Value> = query
        .filters
        .iter()
        .map(|f| {
            json!({
                "fieldFilter": {
                    "field": {"fieldPath": f.field},
                    "op": filter_op_name(f.op),
                    "value": value::encode_value(&f.value),
                }
            })
        })
        .collect();

    match field_filters.len() {
        0 => {}
        1 => {
            structured["where"] = field_filters.into_iter().next().unwrap_or_default();
        }
        _ => {
            structured["where"] = json!({
                "compositeFilter": {"op": "AND", "filters": field_filters}
            });
        }
    }

    if with_order && let Some(order) = &query.order_by {
        let direction = match order.direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured["orderBy"] = json!([{
            "field": {"fieldPath": order.field},
            "direction": direction,
        }]);
    }

    structured
}

const fn filter_op_name(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Eq => "EQUAL",
        FilterOp::Lt => "LESS_THAN",
        FilterOp::Le => "LESS_THAN_OR_EQUAL",
        FilterOp::Gt => "GREATER_THAN",
        FilterOp::Ge => "GREATER_THAN_OR_EQUAL",
    }
}

/// Split a collection path into the `runQuery` parent URL and collection ID.
///
/// `products` queries under the database root; `orders/o1/items` queries the
/// `items` subcollection under the `orders/o1` document.
fn split_collection_path(documents_url: &str, collection: &str) -> (String, String) {
    collection.rsplit_once('/').map_or_else(
        || (documents_url.to_owned(), collection.to_owned()),
        |(parent, collection_id)| {
            (
                format!("{documents_url}/{parent}"),
                collection_id.to_owned(),
            )
        },
    )
}

fn encode_document_fields(data: &Value) -> Result<Value, StoreError> {
    data.as_object().map(value::encode_fields).ok_or_else(|| {
        StoreError::DataCorruption("document data must be an object".to_owned())
    })
}

fn parse_json(text: &str) -> Result<Value, StoreError> {
    serde_json::from_str(text)
        .map_err(|e| StoreError::DataCorruption(format!("bad Firestore response: {e}")))
}

/// Convert a Firestore document resource into a [`Document`].
fn parse_document(resource: &Value) -> Result<Document, StoreError> {
    let name = resource
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::DataCorruption("document missing name".to_owned()))?;
    let id = name
        .rsplit('/')
        .next()
        .unwrap_or(name)
        .to_owned();

    let data = match resource.get("fields").and_then(Value::as_object) {
        Some(fields) => value::decode_fields(fields)?,
        None => json!({}),
    };

    let created_at = parse_timestamp(resource, "createTime")?;
    let updated_at = parse_timestamp(resource, "updateTime")?;

    Ok(Document {
        id,
        data,
        created_at,
        updated_at,
    })
}

fn parse_timestamp(resource: &Value, key: &str) -> Result<DateTime<Utc>, StoreError> {
    let raw = resource
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::DataCorruption(format!("document missing {key}")))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::DataCorruption(format!("bad {key} {raw:?}: {e}")))
}

/// Map a non-success response to a [`StoreError`], keeping the API's status
/// string (e.g. `FAILED_PRECONDITION`) for the index-fallback check.
fn response_error(status: reqwest::StatusCode, body: &str) -> StoreError {
    let api_status = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("status"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_default();

    tracing::error!(
        status = %status,
        api_status = %api_status,
        body = %body.chars().take(300).collect::<String>(),
        "Firestore API returned non-success status"
    );

    StoreError::Backend(format!(
        "HTTP {status} {api_status}: {}",
        body.chars().take(200).collect::<String>()
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::Filter;

    const BASE: &str = "https://firestore.googleapis.com/v1/projects/zinoshop/databases/(default)/documents";

    #[test]
    fn test_split_collection_path_top_level() {
        let (parent, id) = split_collection_path(BASE, "products");
        assert_eq!(parent, BASE);
        assert_eq!(id, "products");
    }

    #[test]
    fn test_split_collection_path_subcollection() {
        let (parent, id) = split_collection_path(BASE, "orders/o1/items");
        assert_eq!(parent, format!("{BASE}/orders/o1"));
        assert_eq!(id, "items");
    }

    #[test]
    fn test_build_structured_query_shape() {
        let query = ListQuery::new()
            .filter("active", FilterOp::Eq, json!(true))
            .filter("price", FilterOp::Le, json!(500))
            .order_desc("rating")
            .limit(10)
            .offset(20);

        let body = build_structured_query("products", &query, true);

        assert_eq!(body["from"][0]["collectionId"], "products");
        assert_eq!(body["limit"], 11);
        assert_eq!(body["offset"], 20);
        assert_eq!(body["where"]["compositeFilter"]["op"], "AND");
        assert_eq!(
            body["where"]["compositeFilter"]["filters"][0]["fieldFilter"]["op"],
            "EQUAL"
        );
        assert_eq!(body["orderBy"][0]["direction"], "DESCENDING");
    }

    #[test]
    fn test_build_structured_query_single_filter_without_order() {
        let query = ListQuery::new()
            .filter("user_id", FilterOp::Eq, json!("u1"))
            .order_desc("rating");

        let body = build_structured_query("cart_items", &query, false);

        assert_eq!(body["where"]["fieldFilter"]["field"]["fieldPath"], "user_id");
        assert!(body.get("orderBy").is_none());
    }

    #[test]
    fn test_parse_document() {
        let resource = json!({
            "name": format!("{BASE}/products/k2J9vR3mXq81LwPdN0Ya"),
            "fields": {"title": {"stringValue": "Aurora Ring"}, "stock": {"integerValue": "3"}},
            "createTime": "2026-08-01T10:00:00.123456Z",
            "updateTime": "2026-08-02T11:30:00Z",
        });

        let doc = parse_document(&resource).unwrap();
        assert_eq!(doc.id, "k2J9vR3mXq81LwPdN0Ya");
        assert_eq!(doc.data["title"], "Aurora Ring");
        assert_eq!(doc.data["stock"], 3);
        assert!(doc.updated_at > doc.created_at);
    }

    #[test]
    fn test_parse_document_missing_fields_is_empty_object() {
        let resource = json!({
            "name": format!("{BASE}/carts/u1"),
            "createTime": "2026-08-01T10:00:00Z",
            "updateTime": "2026-08-01T10:00:00Z",
        });
        let doc = parse_document(&resource).unwrap();
        assert_eq!(doc.data, json!({}));
    }

    #[test]
    fn test_response_error_keeps_api_status() {
        let body = r#"{"error": {"code": 400, "message": "The query requires an index.", "status": "FAILED_PRECONDITION"}}"#;
        let err = response_error(reqwest::StatusCode::BAD_REQUEST, body);
        match err {
            StoreError::Backend(message) => assert!(message.contains("FAILED_PRECONDITION")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

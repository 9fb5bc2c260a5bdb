//! Document store access layer.
//!
//! Persistence is a managed document database (Firestore). Every record is a
//! schemaless JSON document inside a named collection; order line items live
//! in a subcollection under their order document
//! (`orders/{order_id}/items`).
//!
//! The [`DocumentStore`] trait is the generic data-access helper used by all
//! services: create / get / update / delete plus filtered, ordered,
//! paginated queries. Two implementations exist:
//!
//! - [`firestore::FirestoreStore`] - Firestore REST v1 over `reqwest`
//! - [`memory::MemoryStore`] - in-process store for tests and local dev
//!
//! Lifecycle timestamps (`created_at`/`updated_at`) are managed by the store
//! (Firestore's `createTime`/`updateTime`), never by callers.

pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Collection names and subcollection paths.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PRODUCTS: &str = "products";
    pub const ORDERS: &str = "orders";
    pub const CART_ITEMS: &str = "cart_items";
    pub const WISHLIST_ITEMS: &str = "wishlist_items";
    pub const BLOG_POSTS: &str = "blog_posts";

    /// Subcollection holding an order's line items.
    #[must_use]
    pub fn order_items(order_id: &str) -> String {
        format!("{ORDERS}/{order_id}/items")
    }
}

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport failure talking to the database.
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The database rejected the request.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Document does not exist.
    #[error("Document not found")]
    NotFound,

    /// Write conflicts with an existing document.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored data does not deserialize into the expected shape.
    #[error("Data corruption: {0}")]
    DataCorruption(String),
}

/// A raw document: ID, fields, and server-managed lifecycle timestamps.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Deserialize the document fields into a typed record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` when the stored fields do not
    /// match the expected shape.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<Stored<T>, StoreError> {
        let record = serde_json::from_value(self.data).map_err(|e| {
            StoreError::DataCorruption(format!("invalid document {}: {e}", self.id))
        })?;

        Ok(Stored {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            record,
        })
    }
}

/// A typed record paired with its document ID and timestamps.
///
/// Serializes flat, so API responses look like
/// `{"id": "...", "name": "...", "created_at": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct Stored<T> {
    pub id: String,
    #[serde(flatten)]
    pub record: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comparison operator for a query filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A single field filter.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering clause for a query.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A filtered, ordered, paginated query over one collection.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            order_by: None,
            limit: 20,
            offset: 0,
        }
    }
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality or range filter.
    #[must_use]
    pub fn filter(mut self, field: &str, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter {
            field: field.to_owned(),
            op,
            value,
        });
        self
    }

    /// Shorthand for an equality filter.
    #[must_use]
    pub fn filter_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value.into())
    }

    #[must_use]
    pub fn order_asc(mut self, field: &str) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_owned(),
            direction: Direction::Ascending,
        });
        self
    }

    #[must_use]
    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_owned(),
            direction: Direction::Descending,
        });
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// One page of query results.
#[derive(Debug, Clone)]
pub struct Page {
    pub documents: Vec<Document>,
    /// Whether another page likely exists (the page came back full).
    pub has_more: bool,
}

impl Page {
    /// Deserialize every document on the page.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` on the first bad document.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<Vec<Stored<T>>, StoreError> {
        self.documents
            .into_iter()
            .map(Document::into_typed)
            .collect()
    }
}

/// Generic data-access operations over the document database.
///
/// `collection` is a slash-separated path; nested paths address
/// subcollections (e.g. `orders/{id}/items`).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document. With `id = None` the store assigns an ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` when `id` is given and already exists.
    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        data: Value,
    ) -> Result<Document, StoreError>;

    /// Fetch a document by ID. `Ok(None)` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Merge the top-level fields of `patch` into an existing document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when the document does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Value)
    -> Result<Document, StoreError>;

    /// Delete a document. Returns `false` when it did not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Run a filtered, ordered, paginated query.
    async fn query(&self, collection: &str, query: ListQuery) -> Result<Page, StoreError>;
}

/// Serialize a record into document fields.
///
/// # Errors
///
/// Returns `StoreError::DataCorruption` when the record does not serialize
/// to a JSON object.
pub fn to_fields<T: Serialize>(record: &T) -> Result<Value, StoreError> {
    let value = serde_json::to_value(record)
        .map_err(|e| StoreError::DataCorruption(format!("failed to serialize record: {e}")))?;
    if !value.is_object() {
        return Err(StoreError::DataCorruption(
            "record must serialize to an object".to_owned(),
        ));
    }
    Ok(value)
}

/// Ordering over JSON values used for query sorting.
///
/// Nulls sort first, then booleans, numbers, and strings; mixed types
/// compare by that type rank. Matches the ordering both store
/// implementations apply.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    const fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Whether a document's fields satisfy a filter.
#[must_use]
pub fn matches_filter(data: &Value, filter: &Filter) -> bool {
    use std::cmp::Ordering;

    let Some(field_value) = data.get(&filter.field) else {
        return false;
    };

    let ord = compare_values(field_value, &filter.value);
    match filter.op {
        FilterOp::Eq => field_value == &filter.value,
        FilterOp::Lt => ord == Ordering::Less,
        FilterOp::Le => ord != Ordering::Greater,
        FilterOp::Gt => ord == Ordering::Greater,
        FilterOp::Ge => ord != Ordering::Less,
    }
}

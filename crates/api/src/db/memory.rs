//! In-memory document store.
//!
//! Implements the same semantics as the Firestore backend (merge updates,
//! server-managed timestamps, filter/order/offset queries, subcollection
//! paths) against process-local maps. Used by the integration tests and
//! for local development without an emulator.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::Value;

use super::{Document, DocumentStore, ListQuery, Page, StoreError, compare_values, matches_filter};

/// Process-local [`DocumentStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    // collection path -> (document id -> document)
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a Firestore-style 20-character document ID.
    fn generate_id() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(20)
            .map(char::from)
            .collect()
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, BTreeMap<String, Document>>>, StoreError>
    {
        self.collections
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_owned()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, BTreeMap<String, Document>>>, StoreError>
    {
        self.collections
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_owned()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        data: Value,
    ) -> Result<Document, StoreError> {
        let mut collections = self.write()?;
        let docs = collections.entry(collection.to_owned()).or_default();

        let id = match id {
            Some(id) => {
                if docs.contains_key(id) {
                    return Err(StoreError::Conflict(format!(
                        "document {collection}/{id} already exists"
                    )));
                }
                id.to_owned()
            }
            None => Self::generate_id(),
        };

        let now = Utc::now();
        let doc = Document {
            id: id.clone(),
            data,
            created_at: now,
            updated_at: now,
        };
        docs.insert(id, doc.clone());

        Ok(doc)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Document, StoreError> {
        let mut collections = self.write()?;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or(StoreError::NotFound)?;

        if let (Value::Object(existing), Value::Object(updates)) = (&mut doc.data, patch) {
            for (key, value) in updates {
                existing.insert(key, value);
            }
        } else {
            return Err(StoreError::DataCorruption(
                "patch must be an object".to_owned(),
            ));
        }

        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.write()?;
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }

    async fn query(&self, collection: &str, query: ListQuery) -> Result<Page, StoreError> {
        let collections = self.read()?;
        let mut matched: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| query.filters.iter().all(|f| matches_filter(&doc.data, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order_by {
            matched.sort_by(|a, b| {
                let av = a.data.get(&order.field).unwrap_or(&Value::Null);
                let bv = b.data.get(&order.field).unwrap_or(&Value::Null);
                let ord = compare_values(av, bv);
                match order.direction {
                    super::Direction::Ascending => ord,
                    super::Direction::Descending => ord.reverse(),
                }
            });
        }

        let total = matched.len();
        let documents: Vec<Document> = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        let has_more = query.offset + documents.len() < total;

        Ok(Page {
            documents,
            has_more,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::FilterOp;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_assigns_firestore_style_id() {
        let store = MemoryStore::new();
        let doc = store
            .create("products", None, json!({"name": "Aurora Ring"}))
            .await
            .unwrap();
        assert_eq!(doc.id.len(), 20);
        assert!(doc.id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_create_with_id_conflicts() {
        let store = MemoryStore::new();
        store
            .create("users", Some("u1"), json!({"email": "a@b.c"}))
            .await
            .unwrap();
        let err = store
            .create("users", Some("u1"), json!({"email": "a@b.c"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_merges_top_level_fields() {
        let store = MemoryStore::new();
        let doc = store
            .create("products", None, json!({"name": "Ring", "price": "100"}))
            .await
            .unwrap();

        let updated = store
            .update("products", &doc.id, json!({"price": "90"}))
            .await
            .unwrap();

        assert_eq!(updated.data["name"], "Ring");
        assert_eq!(updated.data["price"], "90");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update("products", "missing", json!({"price": "90"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = MemoryStore::new();
        let doc = store.create("posts", None, json!({"slug": "s"})).await.unwrap();
        assert!(store.delete("posts", &doc.id).await.unwrap());
        assert!(!store.delete("posts", &doc.id).await.unwrap());
        assert!(store.get("posts", &doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_filters_orders_and_paginates() {
        let store = MemoryStore::new();
        for (name, rating, active) in [
            ("a", 3.0, true),
            ("b", 5.0, true),
            ("c", 4.0, false),
            ("d", 4.5, true),
        ] {
            store
                .create(
                    "products",
                    None,
                    json!({"name": name, "rating": rating, "active": active}),
                )
                .await
                .unwrap();
        }

        let query = ListQuery::new()
            .filter("active", FilterOp::Eq, json!(true))
            .order_desc("rating")
            .limit(2);
        let page = store.query("products", query).await.unwrap();

        let names: Vec<_> = page
            .documents
            .iter()
            .map(|d| d.data["name"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["b", "d"]);
        assert!(page.has_more);

        let page2 = store
            .query(
                "products",
                ListQuery::new()
                    .filter("active", FilterOp::Eq, json!(true))
                    .order_desc("rating")
                    .limit(2)
                    .offset(2),
            )
            .await
            .unwrap();
        assert_eq!(page2.documents.len(), 1);
        assert!(!page2.has_more);
    }

    #[tokio::test]
    async fn test_subcollections_are_distinct() {
        let store = MemoryStore::new();
        store
            .create("orders/o1/items", None, json!({"product_id": "p1"}))
            .await
            .unwrap();

        let top = store.query("orders", ListQuery::new()).await.unwrap();
        assert!(top.documents.is_empty());

        let items = store
            .query("orders/o1/items", ListQuery::new())
            .await
            .unwrap();
        assert_eq!(items.documents.len(), 1);
    }
}

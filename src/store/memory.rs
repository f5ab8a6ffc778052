use super::{DocumentSnapshot, DocumentStore, Record};
use crate::api::{ApiError, ApiResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// In-memory store with the same merge/delete semantics as Firestore, plus per-collection
/// failure injection.
#[derive(Default)]
pub(crate) struct MemoryStore {
    docs: Mutex<BTreeMap<(String, String), Record>>,
    failing: Mutex<BTreeSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, collection: &str, id: &str, fields: serde_json::Value) -> Self {
        let fields = fields.as_object().cloned().unwrap_or_default();
        self.docs
            .lock()
            .unwrap()
            .insert((collection.to_string(), id.to_string()), fields);
        self
    }

    /// Every call touching `collection` fails with a network error.
    pub fn fail_collection(&self, collection: &str) {
        self.failing.lock().unwrap().insert(collection.to_string());
    }

    pub fn heal_collection(&self, collection: &str) {
        self.failing.lock().unwrap().remove(collection);
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Record> {
        self.docs
            .lock()
            .unwrap()
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    fn check(&self, collection: &str) -> ApiResult<()> {
        if self.failing.lock().unwrap().contains(collection) {
            return Err(ApiError {
                kind: crate::api::ApiErrorKind::Network,
                message: format!("{collection}: connection refused"),
            });
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, collection: &str, id: &str) -> ApiResult<Record> {
        self.check(collection)?;
        self.document(collection, id)
            .ok_or_else(|| ApiError::not_found(format!("{collection}/{id}")))
    }

    async fn get_collection(&self, collection: &str) -> ApiResult<Vec<DocumentSnapshot>> {
        self.check(collection)?;
        let docs = self.docs.lock().unwrap();
        Ok(docs
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|((_, id), fields)| DocumentSnapshot {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn merge_update_document(
        &self,
        collection: &str,
        id: &str,
        partial: Record,
    ) -> ApiResult<()> {
        self.check(collection)?;
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .entry((collection.to_string(), id.to_string()))
            .or_default();
        for (k, v) in partial {
            doc.insert(k, v);
        }
        Ok(())
    }

    async fn delete_field(&self, collection: &str, id: &str, field: &str) -> ApiResult<()> {
        self.check(collection)?;
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .get_mut(&(collection.to_string(), id.to_string()))
            .ok_or_else(|| ApiError::not_found(format!("{collection}/{id}")))?;
        doc.remove(field);
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> ApiResult<()> {
        self.check(collection)?;
        self.docs
            .lock()
            .unwrap()
            .remove(&(collection.to_string(), id.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    fn partial(k: &str, v: &str) -> Record {
        let mut r = Record::new();
        r.insert(k.to_string(), json!(v));
        r
    }

    #[test]
    fn test_merge_update_creates_missing_document() {
        let store = MemoryStore::new();
        block_on(store.merge_update_document("appConfig", "configurations", partial("a", "1")))
            .unwrap();
        assert_eq!(
            store.document("appConfig", "configurations").unwrap()["a"],
            "1"
        );
    }

    #[test]
    fn test_merge_update_is_idempotent_and_keeps_other_fields() {
        let store = MemoryStore::new().with_document(
            "appConfig",
            "configurations",
            json!({"maxUsers": "100", "theme": "dark"}),
        );

        block_on(store.merge_update_document("appConfig", "configurations", partial("maxUsers", "200")))
            .unwrap();
        let once = store.document("appConfig", "configurations").unwrap();
        block_on(store.merge_update_document("appConfig", "configurations", partial("maxUsers", "200")))
            .unwrap();
        let twice = store.document("appConfig", "configurations").unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice["theme"], "dark");
        assert_eq!(twice["maxUsers"], "200");
    }

    #[test]
    fn test_delete_field_removes_only_that_field() {
        let store = MemoryStore::new().with_document(
            "appConfig",
            "configurations",
            json!({"maxUsers": "100", "theme": "dark"}),
        );
        block_on(store.delete_field("appConfig", "configurations", "maxUsers")).unwrap();

        let doc = block_on(store.get_document("appConfig", "configurations")).unwrap();
        assert!(!doc.contains_key("maxUsers"));
        assert_eq!(doc["theme"], "dark");
    }

    #[test]
    fn test_delete_field_on_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = block_on(store.delete_field("appConfig", "configurations", "x")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_failure_injection_is_per_collection() {
        let store = MemoryStore::new()
            .with_document("users", "u1", json!({"uuid": "a"}))
            .with_document("wondersList", "allWonders", json!({"wonders": []}));
        store.fail_collection("wondersList");

        assert!(block_on(store.get_document("wondersList", "allWonders")).is_err());
        assert_eq!(block_on(store.get_collection("users")).unwrap().len(), 1);

        store.heal_collection("wondersList");
        assert!(block_on(store.get_document("wondersList", "allWonders")).is_ok());
    }
}

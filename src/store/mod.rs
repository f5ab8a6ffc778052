//! Remote document store seam.
//!
//! Everything above this module talks to the five primitives of [`DocumentStore`];
//! the Firestore REST implementation lives in `api::firestore`.

#[cfg(test)]
pub(crate) mod memory;

use crate::api::ApiResult;
use async_trait::async_trait;

/// One document's fields.
pub(crate) type Record = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DocumentSnapshot {
    pub id: String,
    pub fields: Record,
}

pub(crate) const COUNTRIES_COLLECTION: &str = "countriesList";
pub(crate) const COUNTRIES_DOC: &str = "allCountries";
pub(crate) const WONDERS_COLLECTION: &str = "wondersList";
pub(crate) const WONDERS_DOC: &str = "allWonders";
pub(crate) const FEEDBACK_COLLECTION: &str = "feedback";
pub(crate) const FEEDBACK_DOC: &str = "userFeedback";
pub(crate) const USERS_COLLECTION: &str = "users";
pub(crate) const CONFIG_COLLECTION: &str = "appConfig";
pub(crate) const CONFIG_DOC: &str = "configurations";

#[async_trait(?Send)]
pub(crate) trait DocumentStore: Send + Sync {
    /// Fails with `NotFound` when the document does not exist.
    async fn get_document(&self, collection: &str, id: &str) -> ApiResult<Record>;

    /// Every document of the collection, each tagged with its id.
    async fn get_collection(&self, collection: &str) -> ApiResult<Vec<DocumentSnapshot>>;

    /// Creates the document when absent, otherwise replaces only the top-level fields named
    /// in `partial`.
    async fn merge_update_document(
        &self,
        collection: &str,
        id: &str,
        partial: Record,
    ) -> ApiResult<()>;

    /// Removes one field; the document itself stays.
    async fn delete_field(&self, collection: &str, id: &str, field: &str) -> ApiResult<()>;

    async fn delete_document(&self, collection: &str, id: &str) -> ApiResult<()>;
}

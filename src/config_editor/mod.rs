//! Key/value editor over the single `appConfig/configurations` document.

use crate::api::{ApiError, ApiResult};
use crate::store::{DocumentStore, Record, CONFIG_COLLECTION, CONFIG_DOC};
use crate::util::display_value;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditMode {
    Add,
    /// The key is locked; only the value may change.
    Edit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ConfigDraft {
    pub mode: EditMode,
    pub key: String,
    pub value: String,
}

impl ConfigDraft {
    pub fn add() -> Self {
        Self {
            mode: EditMode::Add,
            key: String::new(),
            value: String::new(),
        }
    }

    pub fn edit(key: &str, value: &str) -> Self {
        Self {
            mode: EditMode::Edit,
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigEditor {
    entries: BTreeMap<String, String>,
}

impl ConfigEditor {
    /// Non-string values are shown as JSON text.
    pub fn from_record(record: Record) -> Self {
        let entries = record
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::Null => "null".to_string(),
                    other => display_value(&other),
                };
                (k, text)
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the `(key, value)` to store. The key is trimmed since it names a document field;
    /// the value is kept exactly as typed.
    pub fn validate(&self, draft: &ConfigDraft) -> ApiResult<(String, String)> {
        let key = draft.key.trim();
        if key.is_empty() {
            return Err(ApiError::validation("Key cannot be empty."));
        }
        if draft.value.trim().is_empty() {
            return Err(ApiError::validation("Value cannot be empty."));
        }
        match draft.mode {
            EditMode::Add if self.entries.contains_key(key) => Err(ApiError::validation(format!(
                "\"{key}\" already exists. Edit it instead."
            ))),
            EditMode::Edit if !self.entries.contains_key(key) => {
                Err(ApiError::validation(format!("\"{key}\" no longer exists.")))
            }
            _ => Ok((key.to_string(), draft.value.clone())),
        }
    }

    pub fn apply_upsert(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
    }

    pub fn apply_delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

/// A missing document is an empty configuration.
pub(crate) async fn load_config(store: &dyn DocumentStore) -> ApiResult<ConfigEditor> {
    match store.get_document(CONFIG_COLLECTION, CONFIG_DOC).await {
        Ok(record) => Ok(ConfigEditor::from_record(record)),
        Err(e) if e.is_not_found() => Ok(ConfigEditor::default()),
        Err(e) => Err(e),
    }
}

/// Add and edit share this path: validate, then one merge-update of `{key: value}`.
/// Nothing is sent when validation fails.
pub(crate) async fn upsert_field(
    store: &dyn DocumentStore,
    editor: &ConfigEditor,
    draft: &ConfigDraft,
) -> ApiResult<(String, String)> {
    let (key, value) = editor.validate(draft)?;
    let mut partial = Record::new();
    partial.insert(key.clone(), Value::String(value.clone()));
    store
        .merge_update_document(CONFIG_COLLECTION, CONFIG_DOC, partial)
        .await?;
    log::info!("config {key} saved");
    Ok((key, value))
}

pub(crate) async fn delete_entry(store: &dyn DocumentStore, key: &str) -> ApiResult<()> {
    store.delete_field(CONFIG_COLLECTION, CONFIG_DOC, key).await?;
    log::info!("config {key} deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use crate::store::memory::MemoryStore;
    use futures::executor::block_on;
    use serde_json::json;

    fn store_with(fields: Value) -> MemoryStore {
        MemoryStore::new().with_document(CONFIG_COLLECTION, CONFIG_DOC, fields)
    }

    #[test]
    fn test_from_record_renders_non_strings_as_json() {
        let editor = store_load(&store_with(json!({
            "maxUsers": "100",
            "maintenance": false,
            "limits": {"daily": 5},
            "retired": null
        })));
        let e = editor.entries();
        assert_eq!(e["maxUsers"], "100");
        assert_eq!(e["maintenance"], "false");
        assert_eq!(e["limits"], r#"{"daily":5}"#);
        assert_eq!(e["retired"], "null");
        // sorted by key
        let keys: Vec<&String> = e.keys().collect();
        assert_eq!(keys, vec!["limits", "maintenance", "maxUsers", "retired"]);
    }

    fn store_load(store: &MemoryStore) -> ConfigEditor {
        block_on(load_config(store)).unwrap()
    }

    #[test]
    fn test_missing_document_is_empty() {
        let editor = store_load(&MemoryStore::new());
        assert!(editor.is_empty());
    }

    #[test]
    fn test_validation_rejects_blank_without_remote_call() {
        let store = MemoryStore::new();
        let editor = ConfigEditor::default();

        let mut draft = ConfigDraft::add();
        draft.key = "theme".to_string();
        draft.value = "   ".to_string();
        let err = block_on(upsert_field(&store, &editor, &draft)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.message, "Value cannot be empty.");

        draft.key = " ".to_string();
        draft.value = "dark".to_string();
        let err = block_on(upsert_field(&store, &editor, &draft)).unwrap_err();
        assert_eq!(err.message, "Key cannot be empty.");

        assert!(store.document(CONFIG_COLLECTION, CONFIG_DOC).is_none());
    }

    #[test]
    fn test_add_rejects_existing_key() {
        let store = store_with(json!({"maxUsers": "100"}));
        let editor = store_load(&store);
        let draft = ConfigDraft {
            mode: EditMode::Add,
            key: "maxUsers".to_string(),
            value: "5".to_string(),
        };
        let err = block_on(upsert_field(&store, &editor, &draft)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(
            store.document(CONFIG_COLLECTION, CONFIG_DOC).unwrap()["maxUsers"],
            "100"
        );
    }

    #[test]
    fn test_add_creates_document_and_updates_locally() {
        let store = MemoryStore::new();
        let mut editor = store_load(&store);
        let draft = ConfigDraft {
            mode: EditMode::Add,
            key: " theme ".to_string(),
            value: " dark ".to_string(),
        };
        let (k, v) = block_on(upsert_field(&store, &editor, &draft)).unwrap();
        editor.apply_upsert(k, v);

        assert_eq!(editor.entries()["theme"], " dark ");
        assert_eq!(store_load(&store), editor);
    }

    #[test]
    fn test_edit_stores_value_as_typed() {
        let store = store_with(json!({"maxUsers": "100"}));
        let mut editor = store_load(&store);

        let draft = ConfigDraft::edit("maxUsers", " 100 ");
        let (k, v) = block_on(upsert_field(&store, &editor, &draft)).unwrap();
        editor.apply_upsert(k, v);

        assert_eq!(
            store.document(CONFIG_COLLECTION, CONFIG_DOC).unwrap()["maxUsers"],
            " 100 "
        );
        assert_eq!(editor.entries()["maxUsers"], " 100 ");
    }

    #[test]
    fn test_edit_keeps_other_fields() {
        let store = store_with(json!({"maxUsers": "100", "theme": "dark"}));
        let mut editor = store_load(&store);

        let draft = ConfigDraft::edit("maxUsers", "250");
        let (k, v) = block_on(upsert_field(&store, &editor, &draft)).unwrap();
        editor.apply_upsert(k, v);

        let reloaded = store_load(&store);
        assert_eq!(reloaded.entries()["maxUsers"], "250");
        assert_eq!(reloaded.entries()["theme"], "dark");
        assert_eq!(reloaded, editor);
    }

    #[test]
    fn test_delete_then_refetch_shows_absent() {
        let store = store_with(json!({"maxUsers": "100"}));
        let mut editor = store_load(&store);

        block_on(delete_entry(&store, "maxUsers")).unwrap();
        assert!(editor.apply_delete("maxUsers"));

        assert!(editor.is_empty());
        assert!(store_load(&store).is_empty());
    }

    #[test]
    fn test_failed_delete_leaves_local_state() {
        let store = store_with(json!({"maxUsers": "100"}));
        let editor = store_load(&store);
        store.fail_collection(CONFIG_COLLECTION);

        let result = block_on(delete_entry(&store, "maxUsers"));
        assert!(result.is_err());
        // the page only applies the delete on success
        assert_eq!(editor.len(), 1);

        store.heal_collection(CONFIG_COLLECTION);
        assert_eq!(store_load(&store).len(), 1);
    }

    #[test]
    fn test_failed_save_is_transport_error() {
        let store = store_with(json!({}));
        let editor = store_load(&store);
        store.fail_collection(CONFIG_COLLECTION);

        let mut draft = ConfigDraft::add();
        draft.key = "k".to_string();
        draft.value = "v".to_string();
        let err = block_on(upsert_field(&store, &editor, &draft)).unwrap_err();
        assert!(err.is_transport());
        assert!(editor.is_empty());
    }
}

use super::value::{decode_fields, encode_fields};
use super::{google_error_message, ApiError, ApiResult, EnvConfig};
use crate::session::IdentityProvider;
use crate::store::{DocumentSnapshot, DocumentStore, Record};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use std::sync::Arc;

const LIST_PAGE_SIZE: u32 = 300;

#[derive(Deserialize, Debug, Default)]
pub(crate) struct FirestoreDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Option<serde_json::Value>,
}

impl FirestoreDocument {
    pub fn into_snapshot(self) -> DocumentSnapshot {
        DocumentSnapshot {
            id: document_id_from_name(&self.name),
            fields: decode_fields(self.fields.as_ref()),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// `projects/p/databases/(default)/documents/users/abc` -> `abc`
pub(crate) fn document_id_from_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or_default().to_string()
}

/// Field paths that are not plain identifiers must be back-quoted, otherwise Firestore reads
/// `app.version` as the nested path `app` -> `version`.
pub(crate) fn quote_field_path(field: &str) -> String {
    let mut chars = field.chars();
    let simple = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if simple {
        field.to_string()
    } else {
        let escaped = field.replace('\\', "\\\\").replace('`', "\\`");
        format!("`{escaped}`")
    }
}

#[derive(Clone)]
pub(crate) struct FirestoreClient {
    pub(crate) documents_url: String,
    auth: Arc<dyn IdentityProvider>,
}

impl FirestoreClient {
    pub fn new(config: &EnvConfig, auth: Arc<dyn IdentityProvider>) -> Self {
        Self {
            documents_url: documents_root(config),
            auth,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, urlencoding::encode(collection))
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(id)
        )
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
        what: &str,
    ) -> ApiResult<reqwest::Response> {
        let token = self.auth.id_token().await?;

        let client = reqwest::Client::new();
        let mut req = client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", token));
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        Err(status_error(status, &body, what))
    }
}

pub(crate) fn documents_root(config: &EnvConfig) -> String {
    format!(
        "{}/projects/{}/databases/(default)/documents",
        config.firestore_url, config.project_id
    )
}

pub(crate) fn status_error(status: reqwest::StatusCode, body: &str, what: &str) -> ApiError {
    match status.as_u16() {
        404 => ApiError::not_found(what),
        401 | 403 => ApiError::unauthorized(),
        _ => ApiError::http(status, &google_error_message(body), what),
    }
}

pub(crate) fn update_mask<'a>(fields: impl IntoIterator<Item = &'a String>) -> Vec<(&'static str, String)> {
    fields
        .into_iter()
        .map(|f| ("updateMask.fieldPaths", quote_field_path(f)))
        .collect()
}

#[async_trait(?Send)]
impl DocumentStore for FirestoreClient {
    async fn get_document(&self, collection: &str, id: &str) -> ApiResult<Record> {
        let what = format!("{collection}/{id}");
        let res = self
            .send(Method::GET, self.document_url(collection, id), &[], None, &what)
            .await?;
        let doc: FirestoreDocument = res.json().await.map_err(ApiError::parse)?;
        Ok(doc.into_snapshot().fields)
    }

    async fn get_collection(&self, collection: &str) -> ApiResult<Vec<DocumentSnapshot>> {
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
            if let Some(t) = page_token.take() {
                query.push(("pageToken", t));
            }

            let res = self
                .send(
                    Method::GET,
                    self.collection_url(collection),
                    &query,
                    None,
                    collection,
                )
                .await?;
            let page: ListDocumentsResponse = res.json().await.map_err(ApiError::parse)?;
            out.extend(page.documents.into_iter().map(FirestoreDocument::into_snapshot));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(t) => page_token = Some(t),
                None => break,
            }
        }

        log::debug!("fetched {} documents from {collection}", out.len());
        Ok(out)
    }

    async fn merge_update_document(
        &self,
        collection: &str,
        id: &str,
        partial: Record,
    ) -> ApiResult<()> {
        if partial.is_empty() {
            return Ok(());
        }

        let what = format!("{collection}/{id}");
        let query = update_mask(partial.keys());
        let body = serde_json::json!({ "fields": encode_fields(&partial) });
        self.send(
            Method::PATCH,
            self.document_url(collection, id),
            &query,
            Some(body),
            &what,
        )
        .await?;
        Ok(())
    }

    async fn delete_field(&self, collection: &str, id: &str, field: &str) -> ApiResult<()> {
        let what = format!("{collection}/{id}");
        // A masked field absent from the body is removed.
        let mut query = update_mask([&field.to_string()]);
        query.push(("currentDocument.exists", "true".to_string()));
        self.send(
            Method::PATCH,
            self.document_url(collection, id),
            &query,
            Some(serde_json::json!({ "fields": {} })),
            &what,
        )
        .await?;
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> ApiResult<()> {
        let what = format!("{collection}/{id}");
        self.send(
            Method::DELETE,
            self.document_url(collection, id),
            &[],
            None,
            &what,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;

    #[test]
    fn test_documents_root_uses_project_and_default_database() {
        let cfg = EnvConfig::default();
        assert_eq!(
            documents_root(&cfg),
            "https://firestore.googleapis.com/v1/projects/worldinfo-605c3/databases/(default)/documents"
        );
    }

    #[test]
    fn test_document_id_from_name() {
        assert_eq!(
            document_id_from_name("projects/p/databases/(default)/documents/users/Xy12"),
            "Xy12"
        );
        assert_eq!(document_id_from_name(""), "");
    }

    #[test]
    fn test_quote_field_path() {
        assert_eq!(quote_field_path("maxUsers"), "maxUsers");
        assert_eq!(quote_field_path("_private2"), "_private2");
        assert_eq!(quote_field_path("app.version"), "`app.version`");
        assert_eq!(quote_field_path("2fa"), "`2fa`");
        assert_eq!(quote_field_path("we`ird"), "`we\\`ird`");
        assert_eq!(quote_field_path(""), "``");
    }

    #[test]
    fn test_update_mask_one_entry_per_field() {
        let keys = ["maxUsers".to_string(), "app.version".to_string()];
        let mask = update_mask(keys.iter());
        assert_eq!(
            mask,
            vec![
                ("updateMask.fieldPaths", "maxUsers".to_string()),
                ("updateMask.fieldPaths", "`app.version`".to_string()),
            ]
        );
    }

    #[test]
    fn test_status_error_mapping() {
        let nf = status_error(reqwest::StatusCode::NOT_FOUND, "", "appConfig/configurations");
        assert_eq!(nf.kind, ApiErrorKind::NotFound);

        let denied = status_error(reqwest::StatusCode::FORBIDDEN, "", "users");
        assert_eq!(denied.kind, ApiErrorKind::Unauthorized);

        let body = r#"{"error":{"code":400,"message":"Invalid field path","status":"INVALID_ARGUMENT"}}"#;
        let bad = status_error(reqwest::StatusCode::BAD_REQUEST, body, "appConfig/configurations");
        assert_eq!(bad.kind, ApiErrorKind::Http);
        assert!(bad.message.contains("Invalid field path"));
    }

    #[test]
    fn test_list_response_contract_deserialize() {
        let json = r#"{
            "documents": [
                {
                    "name": "projects/p/databases/(default)/documents/users/u1",
                    "fields": {"uuid": {"stringValue": "abc"}},
                    "createTime": "2025-01-01T00:00:00Z"
                },
                {"name": "projects/p/databases/(default)/documents/users/u2"}
            ],
            "nextPageToken": "tok"
        }"#;
        let parsed: ListDocumentsResponse =
            serde_json::from_str(json).expect("list response should parse");
        assert_eq!(parsed.next_page_token.as_deref(), Some("tok"));

        let snaps: Vec<DocumentSnapshot> = parsed
            .documents
            .into_iter()
            .map(FirestoreDocument::into_snapshot)
            .collect();
        assert_eq!(snaps[0].id, "u1");
        assert_eq!(snaps[0].fields["uuid"], "abc");
        assert_eq!(snaps[1].id, "u2");
        assert!(snaps[1].fields.is_empty());
    }

    #[test]
    fn test_empty_collection_response_deserialize() {
        let parsed: ListDocumentsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.documents.is_empty());
        assert!(parsed.next_page_token.is_none());
    }
}

pub(crate) mod firestore;
pub(crate) mod identity;
pub(crate) mod value;

use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    NotFound,
    Unauthorized,
    Network,
    Http,
    Parse,
    Validation,
    Auth,
}

#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    pub(crate) fn not_found(what: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: format!("{what} not found"),
        }
    }

    pub(crate) fn http(status: reqwest::StatusCode, detail: &str, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {detail}"),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Validation,
            message: message.into(),
        }
    }

    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Auth,
            message: message.into(),
        }
    }

    /// Network, HTTP, parse and rejected-credential failures: shown as a banner, never retried.
    pub(crate) fn is_transport(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::Network
                | ApiErrorKind::Http
                | ApiErrorKind::Parse
                | ApiErrorKind::Unauthorized
        )
    }

    pub(crate) fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Google APIs wrap failures as `{"error": {"code", "message", "status"}}`; only the message is kept.
#[derive(Deserialize, Debug, Default)]
pub(crate) struct GoogleErrorBody {
    #[serde(default)]
    pub error: GoogleErrorDetail,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct GoogleErrorDetail {
    #[serde(default)]
    pub message: String,
}

pub(crate) fn google_error_message(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(b) if !b.error.message.trim().is_empty() => b.error.message,
        _ => body.trim().to_string(),
    }
}

const DEFAULT_PROJECT_ID: &str = "worldinfo-605c3";
const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EnvConfig {
    pub api_key: String,
    pub project_id: String,
    pub firestore_url: String,
    pub identity_url: String,
    pub secure_token_url: String,
    pub log_level: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            secure_token_url: DEFAULT_SECURE_TOKEN_URL.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl EnvConfig {
    /// Reads `window.ENV`, accepting both `FIREBASE_API_KEY` and `firebase_api_key` spellings.
    pub fn from_window() -> Self {
        let lookup = |name: &str| -> Option<String> {
            let env = web_sys::window()?.get("ENV")?;
            if env.is_undefined() || !env.is_object() {
                return None;
            }
            [name.to_string(), name.to_ascii_lowercase()]
                .iter()
                .find_map(|k| js_sys::Reflect::get(&env, &k.as_str().into()).ok()?.as_string())
        };
        Self::from_lookup(lookup)
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let get = |name: &str, fallback: String| {
            lookup(name)
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        Self {
            api_key: get("FIREBASE_API_KEY", d.api_key),
            project_id: get("FIREBASE_PROJECT_ID", d.project_id),
            firestore_url: get("FIRESTORE_URL", d.firestore_url),
            identity_url: get("IDENTITY_URL", d.identity_url),
            secure_token_url: get("SECURE_TOKEN_URL", d.secure_token_url),
            log_level: get("LOG_LEVEL", d.log_level),
        }
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

use serde::{Deserialize, Serialize};

/// Id token of the signed-in administrator, written by the session gate.
pub(crate) const TOKEN_KEY: &str = "adminToken";
/// Provider credential (refresh token etc.) used to restore a session after reload.
pub(crate) const AUTH_USER_KEY: &str = "worldinfo_auth_user";
pub(crate) const SIDEBAR_COLLAPSED_KEY: &str = "worldinfo_sidebar_collapsed";

/// String key/value persistence that survives reloads.
pub(crate) trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// `window.localStorage`. Every call silently does nothing when storage is unavailable
/// (private mode, sandboxed iframe).
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BrowserStorage;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = local_storage() {
            if storage.set_item(key, value).is_err() {
                log::warn!("localStorage write failed for {key}");
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

pub(crate) fn load_json<T: for<'de> Deserialize<'de>>(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> Option<T> {
    let json = storage.get(key)?;
    match serde_json::from_str(&json) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("discarding unreadable {key}: {e}");
            None
        }
    }
}

pub(crate) fn save_json<T: Serialize>(storage: &dyn KeyValueStorage, key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        storage.set(key, &json);
    }
}

pub(crate) fn load_flag(storage: &dyn KeyValueStorage, key: &str) -> bool {
    storage
        .get(key)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false)
}

pub(crate) fn save_flag(storage: &dyn KeyValueStorage, key: &str, value: bool) {
    storage.set(key, if value { "1" } else { "0" });
}

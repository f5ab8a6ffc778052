//! Session gate: the single source of truth for "is the administrator signed in".
//!
//! The identity provider reports session events (`Some(user)` / `None`) through
//! [`IdentityProvider::observe`]; the gate folds them into a three-state machine, mirrors
//! the id token into persistent storage, and notifies its own watchers on state changes.

pub(crate) mod listeners;

pub(crate) use listeners::{Listener, Listeners, Subscription};

use crate::api::{ApiError, ApiResult};
use crate::storage::{KeyValueStorage, TOKEN_KEY};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AuthUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at_ms: i64,
}

pub(crate) type SessionEvent = Option<AuthUser>;

#[async_trait(?Send)]
pub(crate) trait IdentityProvider: Send + Sync {
    /// Emits `Some(user)` to observers on success. Emits nothing on failure.
    async fn sign_in(&self, email: &str, password: &str) -> ApiResult<AuthUser>;

    /// Emits `None` once local credentials are dropped.
    async fn sign_out(&self) -> ApiResult<()>;

    /// Re-establishes a persisted session. Emits exactly one event: the restored user or
    /// `None`.
    async fn restore(&self);

    /// A currently valid id token, refreshed (and re-emitted) when close to expiry.
    async fn id_token(&self) -> ApiResult<String>;

    fn observe(&self, listener: Listener<SessionEvent>) -> Subscription;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) enum SessionState {
    /// Before the provider's first callback. Blocks navigation.
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

#[derive(Default)]
struct Snapshot {
    state: SessionState,
}

/// Applies provider events; shared between the gate and its provider subscription.
#[derive(Clone)]
struct GateCore {
    snapshot: Arc<Mutex<Snapshot>>,
    storage: Arc<dyn KeyValueStorage>,
    watchers: Listeners<SessionState>,
}

impl GateCore {
    fn apply(&self, event: &SessionEvent) {
        let (next, changed) = {
            let mut snap = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
            match event {
                Some(user) => self.storage.set(TOKEN_KEY, &user.id_token),
                None => self.storage.remove(TOKEN_KEY),
            }
            let next = if event.is_some() {
                SessionState::Authenticated
            } else {
                SessionState::Unauthenticated
            };
            let changed = snap.state != next;
            snap.state = next;
            (next, changed)
        };

        if changed {
            log::info!("session state -> {next:?}");
            self.watchers.emit(&next);
        }
    }
}

pub(crate) struct SessionGate {
    provider: Arc<dyn IdentityProvider>,
    core: GateCore,
    _provider_subscription: Subscription,
}

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn validate_credentials(email: &str, password: &str) -> ApiResult<()> {
    if email.trim().is_empty() {
        return Err(ApiError::validation("Please input your email!"));
    }
    if !email.contains('@') {
        return Err(ApiError::validation("Enter a valid email!"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(
            "Password must be at least 6 characters!",
        ));
    }
    Ok(())
}

impl SessionGate {
    pub fn new(provider: Arc<dyn IdentityProvider>, storage: Arc<dyn KeyValueStorage>) -> Self {
        let core = GateCore {
            snapshot: Arc::new(Mutex::new(Snapshot::default())),
            storage,
            watchers: Listeners::default(),
        };

        let sink = core.clone();
        let sub = provider.observe(Arc::new(move |event: &SessionEvent| sink.apply(event)));

        Self {
            provider,
            core,
            _provider_subscription: sub,
        }
    }

    pub fn state(&self) -> SessionState {
        self.core
            .snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .state
    }

    /// Called with the new state on every transition.
    pub fn watch(&self, listener: Listener<SessionState>) -> Subscription {
        self.core.watchers.subscribe(listener)
    }

    /// Initial restore; leaves `Unknown` once the provider answers.
    pub async fn start(&self) {
        self.provider.restore().await;
    }

    /// On failure the state and the stored token are left untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<()> {
        validate_credentials(email, password)?;

        match self.provider.sign_in(email.trim(), password).await {
            Ok(user) => {
                // The provider has normally emitted already; applying again is a no-op.
                self.core.apply(&Some(user));
                Ok(())
            }
            Err(e) => {
                log::warn!("sign-in failed: {e}");
                Err(e)
            }
        }
    }

    /// Local cleanup happens even when the provider call fails.
    pub async fn sign_out(&self) {
        if let Err(e) = self.provider.sign_out().await {
            log::warn!("provider sign-out failed, clearing local session anyway: {e}");
        }
        self.core.apply(&None);
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::api::ApiErrorKind;

    /// Scripted identity provider.
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        pub password: String,
        pub restored: Option<AuthUser>,
        pub fail_sign_out: bool,
        pub listeners: Listeners<SessionEvent>,
        pub current: Mutex<Option<AuthUser>>,
    }

    pub(crate) fn user(token: &str) -> AuthUser {
        AuthUser {
            uid: "admin-uid".to_string(),
            email: Some("admin@worldinfo.app".to_string()),
            id_token: token.to_string(),
            refresh_token: "refresh".to_string(),
            expires_at_ms: i64::MAX,
        }
    }

    impl FakeProvider {
        pub fn with_password(password: &str) -> Self {
            Self {
                password: password.to_string(),
                ..Self::default()
            }
        }

        /// Simulates a token refresh pushed by the provider.
        pub fn refresh(&self, token: &str) {
            let u = user(token);
            *self.current.lock().unwrap() = Some(u.clone());
            self.listeners.emit(&Some(u));
        }
    }

    #[async_trait(?Send)]
    impl IdentityProvider for FakeProvider {
        async fn sign_in(&self, _email: &str, password: &str) -> ApiResult<AuthUser> {
            if password != self.password {
                return Err(ApiError::auth("Invalid email or password."));
            }
            let u = user("token-1");
            *self.current.lock().unwrap() = Some(u.clone());
            self.listeners.emit(&Some(u.clone()));
            Ok(u)
        }

        async fn sign_out(&self) -> ApiResult<()> {
            if self.fail_sign_out {
                return Err(ApiError {
                    kind: ApiErrorKind::Network,
                    message: "offline".to_string(),
                });
            }
            *self.current.lock().unwrap() = None;
            self.listeners.emit(&None);
            Ok(())
        }

        async fn restore(&self) {
            let restored = self.restored.clone();
            *self.current.lock().unwrap() = restored.clone();
            self.listeners.emit(&restored);
        }

        async fn id_token(&self) -> ApiResult<String> {
            self.current
                .lock()
                .unwrap()
                .as_ref()
                .map(|u| u.id_token.clone())
                .ok_or_else(ApiError::unauthorized)
        }

        fn observe(&self, listener: Listener<SessionEvent>) -> Subscription {
            self.listeners.subscribe(listener)
        }
    }
}

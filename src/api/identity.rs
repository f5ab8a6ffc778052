use super::{ApiError, ApiErrorKind, ApiResult, EnvConfig, GoogleErrorBody};
use crate::session::{AuthUser, IdentityProvider, Listener, Listeners, SessionEvent, Subscription};
use crate::storage::{load_json, save_json, KeyValueStorage, AUTH_USER_KEY};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Tokens this close to expiry are refreshed before use.
pub(crate) const REFRESH_MARGIN_MS: i64 = 60_000;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub user_id: String,
}

fn expires_at(now_ms: i64, expires_in: &str) -> i64 {
    let secs: i64 = expires_in.trim().parse().unwrap_or(3600);
    now_ms + secs * 1000
}

impl SignInResponse {
    pub fn into_user(self, now_ms: i64) -> AuthUser {
        AuthUser {
            expires_at_ms: expires_at(now_ms, &self.expires_in),
            uid: self.local_id,
            email: self.email,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        }
    }
}

impl RefreshResponse {
    /// The refresh endpoint does not return the email; it is carried over.
    pub fn into_user(self, previous: &AuthUser, now_ms: i64) -> AuthUser {
        AuthUser {
            expires_at_ms: expires_at(now_ms, &self.expires_in),
            uid: self.user_id,
            email: previous.email.clone(),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        }
    }
}

pub(crate) fn needs_refresh(user: &AuthUser, now_ms: i64) -> bool {
    user.expires_at_ms - now_ms <= REFRESH_MARGIN_MS
}

pub(crate) fn refresh_form(refresh_token: &str) -> String {
    format!(
        "grant_type=refresh_token&refresh_token={}",
        urlencoding::encode(refresh_token)
    )
}

/// `TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account...` -> `TOO_MANY_ATTEMPTS_TRY_LATER`
pub(crate) fn provider_error_code(body: &str) -> String {
    let message = serde_json::from_str::<GoogleErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_default();
    message
        .split(" : ")
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub(crate) fn auth_error_message(code: &str) -> &'static str {
    match code {
        "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" => {
            "Invalid email or password."
        }
        "INVALID_EMAIL" => "Enter a valid email!",
        "USER_DISABLED" => "This account has been disabled.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Please try again later.",
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
            "Your session has expired. Please sign in again."
        }
        "INVALID_API_KEY" | "API_KEY_INVALID" => "The console is misconfigured (API key).",
        _ => "Sign-in failed. Please try again.",
    }
}

/// Firebase Authentication over the Identity Toolkit and Secure Token REST endpoints.
pub(crate) struct FirebaseAuth {
    config: EnvConfig,
    storage: Arc<dyn KeyValueStorage>,
    current: Mutex<Option<AuthUser>>,
    listeners: Listeners<SessionEvent>,
    clock: fn() -> i64,
}

impl FirebaseAuth {
    pub fn new(config: EnvConfig, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_clock(config, storage, crate::util::now_ms)
    }

    pub(crate) fn with_clock(
        config: EnvConfig,
        storage: Arc<dyn KeyValueStorage>,
        clock: fn() -> i64,
    ) -> Self {
        Self {
            config,
            storage,
            current: Mutex::new(None),
            listeners: Listeners::default(),
            clock,
        }
    }

    fn current(&self) -> Option<AuthUser> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_current(&self, user: Option<AuthUser>) {
        match &user {
            Some(u) => save_json(self.storage.as_ref(), AUTH_USER_KEY, u),
            None => self.storage.remove(AUTH_USER_KEY),
        }
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = user.clone();
        self.listeners.emit(&user);
    }

    async fn post_for_error(&self, res: reqwest::Response) -> ApiError {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        let code = provider_error_code(&body);
        log::debug!("identity provider answered {status}: {code}");
        if status.is_client_error() {
            ApiError::auth(auth_error_message(&code))
        } else {
            ApiError::http(status, &code, "identity provider")
        }
    }

    async fn request_refresh(&self, user: &AuthUser) -> ApiResult<AuthUser> {
        let url = format!(
            "{}/token?key={}",
            self.config.secure_token_url,
            urlencoding::encode(&self.config.api_key)
        );
        let res = reqwest::Client::new()
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(refresh_form(&user.refresh_token))
            .send()
            .await
            .map_err(ApiError::network)?;

        if !res.status().is_success() {
            return Err(self.post_for_error(res).await);
        }
        let body: RefreshResponse = res.json().await.map_err(ApiError::parse)?;
        Ok(body.into_user(user, (self.clock)()))
    }

    /// Rejected refresh tokens drop the session; transport failures keep the credential.
    fn settle_refresh(&self, outcome: ApiResult<AuthUser>) -> ApiResult<AuthUser> {
        match outcome {
            Ok(fresh) => {
                log::debug!("id token refreshed for {}", fresh.uid);
                self.set_current(Some(fresh.clone()));
                Ok(fresh)
            }
            Err(e) if e.kind == ApiErrorKind::Auth => {
                log::warn!("refresh token rejected: {e}");
                self.set_current(None);
                Err(ApiError::unauthorized())
            }
            Err(e) => Err(e),
        }
    }

    /// Startup variant: a transport failure still resolves the session as signed out for this
    /// load, but the stored credential survives for the next one.
    fn settle_restore(&self, outcome: ApiResult<AuthUser>) {
        match self.settle_refresh(outcome) {
            Ok(_) => {}
            Err(e) if e.kind == ApiErrorKind::Unauthorized => {}
            Err(e) => {
                log::warn!("could not restore session, will retry on next load: {e}");
                *self.current.lock().unwrap_or_else(|e| e.into_inner()) = None;
                self.listeners.emit(&None);
            }
        }
    }

    async fn refresh(&self, user: &AuthUser) -> ApiResult<AuthUser> {
        let outcome = self.request_refresh(user).await;
        self.settle_refresh(outcome)
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> ApiResult<AuthUser> {
        let url = format!(
            "{}/accounts:signInWithPassword?key={}",
            self.config.identity_url,
            urlencoding::encode(&self.config.api_key)
        );
        let payload = SignInRequest {
            email,
            password,
            return_secure_token: true,
        };

        let res = reqwest::Client::new()
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(ApiError::network)?;

        if !res.status().is_success() {
            return Err(self.post_for_error(res).await);
        }

        let body: SignInResponse = res.json().await.map_err(ApiError::parse)?;
        let user = body.into_user((self.clock)());
        log::info!("signed in as {}", user.email.as_deref().unwrap_or(&user.uid));
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> ApiResult<()> {
        // Credentials are bearer tokens; forgetting them is the whole sign-out.
        self.set_current(None);
        Ok(())
    }

    async fn restore(&self) {
        let Some(stored) = load_json::<AuthUser>(self.storage.as_ref(), AUTH_USER_KEY) else {
            self.listeners.emit(&None);
            return;
        };

        if !needs_refresh(&stored, (self.clock)()) {
            self.set_current(Some(stored));
            return;
        }

        let outcome = self.request_refresh(&stored).await;
        self.settle_restore(outcome);
    }

    async fn id_token(&self) -> ApiResult<String> {
        let user = self.current().ok_or_else(ApiError::unauthorized)?;
        if !needs_refresh(&user, (self.clock)()) {
            return Ok(user.id_token);
        }
        Ok(self.refresh(&user).await?.id_token)
    }

    fn observe(&self, listener: Listener<SessionEvent>) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

//! Scripted in-memory `AuthApi` for tests.
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};

use crate::services::backend::client::{
    AuthApi, AuthMethodsList, AuthProviderInfo, AuthResponse, BackendError, BackendResult,
    OAuth2Exchange, UserRecord,
};

/// Unsigned JWT-shaped token carrying `claims`.
pub fn make_token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// Token for `id` that expires in an hour.
pub fn live_token(id: &str) -> String {
    make_token(json!({"id": id, "exp": Utc::now().timestamp() + 3600}))
}

pub fn user(id: &str) -> UserRecord {
    let mut fields = Map::new();
    fields.insert("id".into(), json!(id));
    UserRecord::new(fields)
}

pub fn auth_response(id: &str) -> AuthResponse {
    AuthResponse {
        token: live_token(id),
        record: user(id),
    }
}

pub fn provider(name: &str, state: &str, auth_url: &str) -> AuthProviderInfo {
    AuthProviderInfo {
        name: name.into(),
        display_name: None,
        state: state.into(),
        code_verifier: format!("{name}-verifier"),
        code_challenge: String::new(),
        code_challenge_method: "S256".into(),
        auth_url: auth_url.into(),
    }
}

fn unscripted() -> BackendError {
    BackendError::Status {
        status: 500,
        message: "not scripted".into(),
    }
}

#[derive(Default)]
pub struct FakeAuthApi {
    refresh: Mutex<Option<BackendResult<AuthResponse>>>,
    methods: Mutex<Option<BackendResult<AuthMethodsList>>>,
    exchange: Mutex<Option<BackendResult<AuthResponse>>>,

    pub refresh_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
    pub last_refresh_token: Mutex<Option<String>>,
    pub last_exchange: Mutex<Option<OAuth2Exchange>>,
}

impl FakeAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refresh(self, result: BackendResult<AuthResponse>) -> Self {
        *self.refresh.lock() = Some(result);
        self
    }

    pub fn with_providers(self, providers: Vec<AuthProviderInfo>) -> Self {
        *self.methods.lock() = Some(Ok(AuthMethodsList {
            auth_providers: providers,
            ..AuthMethodsList::default()
        }));
        self
    }

    pub fn with_methods_error(self) -> Self {
        *self.methods.lock() = Some(Err(BackendError::Transport("connection refused".into())));
        self
    }

    pub fn with_exchange(self, result: BackendResult<AuthResponse>) -> Self {
        *self.exchange.lock() = Some(result);
        self
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_count(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    async fn auth_refresh(&self, _collection: &str, token: &str) -> BackendResult<AuthResponse> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_refresh_token.lock() = Some(token.to_owned());
        self.refresh.lock().clone().unwrap_or_else(|| Err(unscripted()))
    }

    async fn list_auth_methods(&self, _collection: &str) -> BackendResult<AuthMethodsList> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.methods
            .lock()
            .clone()
            .unwrap_or_else(|| Ok(AuthMethodsList::default()))
    }

    async fn auth_with_oauth2(
        &self,
        _collection: &str,
        exchange: &OAuth2Exchange,
    ) -> BackendResult<AuthResponse> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_exchange.lock() = Some(exchange.clone());
        self.exchange.lock().clone().unwrap_or_else(|| Err(unscripted()))
    }
}

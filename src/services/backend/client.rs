//! Auth backend interface used by the session pipeline and the OAuth2 handlers.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Backend-layer errors (transport/status/decoding).
///
/// Note:
/// - Kept independent from `AppError`: every auth failure is turned into a redirect by the
///   caller, never into an error response.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("backend transport error: {0}")]
    Transport(String),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("backend response decode error: {0}")]
    Decode(String),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

/// Backend user record (at minimum an `id`).
///
/// Cloning yields an owned deep copy, so a snapshot taken from the auth store is
/// detached from later store updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(Map<String, Value>);

impl UserRecord {
    #[cfg(test)]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Keep only the listed fields.
    pub fn retain_fields(&self, keep: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| keep.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

/// Successful auth response (`auth-refresh`, `auth-with-oauth2`).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(alias = "model")]
    pub record: UserRecord,
}

/// OAuth2 provider descriptor returned by `auth-methods`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthProviderInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub state: String,
    pub code_verifier: String,
    #[serde(default)]
    pub code_challenge: String,
    #[serde(default)]
    pub code_challenge_method: String,
    pub auth_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthMethodsList {
    #[serde(default)]
    pub auth_providers: Vec<AuthProviderInfo>,
}

/// Body of the OAuth2 code exchange.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2Exchange {
    pub provider: String,
    pub code: String,
    pub code_verifier: String,
    pub redirect_url: String,
}

/// The auth endpoints of a collection-based backend.
///
/// Implementations must be shareable across requests (typically they only hold a
/// connection-pooled HTTP client). Per-request auth state lives in
/// [`AuthStore`](super::AuthStore), never here.
#[async_trait]
pub trait AuthApi: Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Refresh the session identified by `token`; returns a new token and the user record.
    async fn auth_refresh(&self, collection: &str, token: &str) -> BackendResult<AuthResponse>;

    // List the auth methods (OAuth2 providers with fresh state/verifier) of a collection.
    async fn list_auth_methods(&self, collection: &str) -> BackendResult<AuthMethodsList>;

    // Exchange an OAuth2 authorization code for a session.
    async fn auth_with_oauth2(
        &self,
        collection: &str,
        exchange: &OAuth2Exchange,
    ) -> BackendResult<AuthResponse>;
}

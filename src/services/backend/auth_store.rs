//! Per-request auth store: the current session token plus the cached user record.
//!
//! Responsibility:
//! - Restore the session from the request cookie (`load_from_cookie`)
//! - Structural token check (`is_valid`); the signature is only confirmed by the backend
//! - Serialize the session back into a response cookie (`export_to_cookie`)
//!
//! Clones share the same state. A store is created per request by
//! [`BackendFactory::client`](super::BackendFactory::client) and never crosses requests.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use chrono::Utc;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use time::OffsetDateTime;

use crate::services::backend::client::UserRecord;

/// Browsers drop cookies larger than this.
const MAX_COOKIE_BYTES: usize = 4096;

/// Fields kept when the full model does not fit into the cookie.
const MINIMAL_MODEL_FIELDS: &[&str] = &[
    "id",
    "email",
    "username",
    "verified",
    "collectionId",
    "collectionName",
];

// JWT segments are base64url; some issuers keep the padding.
const TOKEN_SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Attributes of the exported auth cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieOptions {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl CookieOptions {
    /// HttpOnly + SameSite=Lax; `secure` is decided by the caller (production only).
    pub fn new(secure: bool) -> Self {
        Self {
            secure,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }

    fn build(&self, key: &str, value: String, expires: Option<OffsetDateTime>) -> Cookie<'static> {
        let mut builder = Cookie::build((key.to_owned(), value))
            .path("/")
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site);

        if let Some(expires) = expires {
            builder = builder.expires(expires);
        }

        builder.build()
    }

    fn cleared(&self, key: &str) -> Cookie<'static> {
        Cookie::build((key.to_owned(), String::new()))
            .path("/")
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(time::Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build()
    }
}

#[derive(Debug, Default, Deserialize)]
struct CookiePayload {
    #[serde(default)]
    token: String,
    #[serde(default, alias = "record")]
    model: Option<UserRecord>,
}

#[derive(Debug, Default)]
struct AuthState {
    token: String,
    model: Option<UserRecord>,
}

#[derive(Clone, Debug, Default)]
pub struct AuthStore {
    inner: Arc<RwLock<AuthState>>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> String {
        self.inner.read().token.clone()
    }

    /// Deep copy of the cached user record.
    pub fn model(&self) -> Option<UserRecord> {
        self.inner.read().model.clone()
    }

    /// Token is present, well-formed and not past its `exp`.
    pub fn is_valid(&self) -> bool {
        is_token_valid(&self.inner.read().token, Utc::now().timestamp())
    }

    pub fn save(&self, token: impl Into<String>, model: Option<UserRecord>) {
        let mut state = self.inner.write();
        state.token = token.into();
        state.model = model;
    }

    pub fn clear(&self) {
        self.save(String::new(), None);
    }

    /// Replace the store with the session found in cookie `key` of a raw `Cookie` header.
    ///
    /// A missing or malformed cookie leaves the store empty.
    pub fn load_from_cookie(&self, cookie_header: &str, key: &str) {
        let payload = Cookie::split_parse_encoded(cookie_header)
            .filter_map(Result::ok)
            .find(|c| c.name() == key)
            .and_then(|c| serde_json::from_str::<CookiePayload>(c.value()).ok())
            .unwrap_or_default();

        self.save(payload.token, payload.model);
    }

    /// Serialize the store into a `Set-Cookie` cookie named `key`.
    ///
    /// An empty store yields an expired, empty cookie so the browser drops the session.
    pub fn export_to_cookie(&self, key: &str, options: &CookieOptions) -> Cookie<'static> {
        let state = self.inner.read();
        if state.token.is_empty() {
            return options.cleared(key);
        }

        let expires = token_expiry(&state.token)
            .and_then(|exp| OffsetDateTime::from_unix_timestamp(exp).ok());

        let cookie = options.build(key, cookie_value(&state.token, state.model.as_ref()), expires);
        if cookie.encoded().to_string().len() <= MAX_COOKIE_BYTES {
            return cookie;
        }

        tracing::debug!(cookie = key, "auth cookie too large, exporting minimal model");
        let minimal = state
            .model
            .as_ref()
            .map(|m| m.retain_fields(MINIMAL_MODEL_FIELDS));
        options.build(key, cookie_value(&state.token, minimal.as_ref()), expires)
    }
}

fn cookie_value(token: &str, model: Option<&UserRecord>) -> String {
    json!({ "token": token, "model": model }).to_string()
}

/// Decoded JWT payload, if the token has three segments and a non-empty JSON object payload.
pub fn token_payload(token: &str) -> Option<Map<String, Value>> {
    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = TOKEN_SEGMENT.decode(payload).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(claims) if !claims.is_empty() => Some(claims),
        _ => None,
    }
}

/// `exp` claim (unix seconds).
pub fn token_expiry(token: &str) -> Option<i64> {
    let exp = token_payload(token)?.get("exp")?.as_f64()?;
    Some(exp as i64)
}

/// Structural validity at `now` (unix seconds). A token without `exp` never expires locally.
pub fn is_token_valid(token: &str, now: i64) -> bool {
    let Some(claims) = token_payload(token) else {
        return false;
    };

    match claims.get("exp") {
        None => true,
        Some(exp) => exp.as_f64().is_some_and(|exp| exp > now as f64),
    }
}

//! Per-request backend handle: shared transport + request-owned auth store.
use std::sync::Arc;

use crate::services::backend::{
    auth_store::AuthStore,
    client::{AuthApi, AuthMethodsList, AuthResponse, BackendResult, OAuth2Exchange},
};

/// Backend client bound to one request.
///
/// Clones share the auth store, so the session middleware observes changes made by
/// handlers (OAuth2 login, logout) when it writes the response cookie.
#[derive(Clone)]
pub struct BackendClient {
    api: Arc<dyn AuthApi>,
    auth_store: AuthStore,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the session token
        f.debug_struct("BackendClient")
            .field("backend", &self.api.backend_name())
            .field("authenticated", &!self.auth_store.token().is_empty())
            .finish()
    }
}

impl BackendClient {
    pub fn new(api: Arc<dyn AuthApi>, auth_store: AuthStore) -> Self {
        Self { api, auth_store }
    }

    pub fn auth_store(&self) -> &AuthStore {
        &self.auth_store
    }

    pub fn backend_name(&self) -> &'static str {
        self.api.backend_name()
    }

    pub fn collection<'a>(&'a self, name: &'a str) -> RecordService<'a> {
        RecordService {
            client: self,
            collection: name,
        }
    }
}

/// Auth operations scoped to one collection.
pub struct RecordService<'a> {
    client: &'a BackendClient,
    collection: &'a str,
}

impl RecordService<'_> {
    /// Refresh the stored session. On success the store holds the new token and record.
    pub async fn auth_refresh(&self) -> BackendResult<AuthResponse> {
        let token = self.client.auth_store.token();
        let resp = self.client.api.auth_refresh(self.collection, &token).await?;

        self.client
            .auth_store
            .save(resp.token.clone(), Some(resp.record.clone()));
        Ok(resp)
    }

    pub async fn list_auth_methods(&self) -> BackendResult<AuthMethodsList> {
        self.client.api.list_auth_methods(self.collection).await
    }

    /// Exchange an OAuth2 code. On success the store holds the new session.
    pub async fn auth_with_oauth2(&self, exchange: &OAuth2Exchange) -> BackendResult<AuthResponse> {
        let resp = self
            .client
            .api
            .auth_with_oauth2(self.collection, exchange)
            .await?;

        self.client
            .auth_store
            .save(resp.token.clone(), Some(resp.record.clone()));
        Ok(resp)
    }
}

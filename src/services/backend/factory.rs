/// Factory: one backend transport per process, one `BackendClient` per request.
use std::sync::Arc;

use crate::config::Config;
use crate::services::backend::{
    auth_store::AuthStore,
    client::{AuthApi, BackendError},
    handle::BackendClient,
    http::HttpAuthApi,
};

#[derive(Clone)]
pub struct BackendFactory {
    api: Arc<dyn AuthApi>,
}

impl std::fmt::Debug for BackendFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendFactory")
            .field("backend", &self.api.backend_name())
            .finish()
    }
}

impl BackendFactory {
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        Self { api }
    }

    /// Fresh client with an empty auth store.
    pub fn client(&self) -> BackendClient {
        BackendClient::new(self.api.clone(), AuthStore::new())
    }
}

pub fn build_backend_factory(config: &Config) -> Result<BackendFactory, BackendError> {
    let api = HttpAuthApi::new(&config.backend_url)?;
    tracing::info!(backend_url = %api.base_url(), "auth backend configured");

    Ok(BackendFactory::new(Arc::new(api)))
}

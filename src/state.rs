/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - backend: transport shared by all requests (clients are created per request)
 *   - settings: injected session/cookie/OAuth2 configuration
 * - Cheap to Clone (Arc inside)
 */
use std::sync::Arc;

use crate::services::{backend::BackendFactory, session::SessionSettings};

#[derive(Clone, Debug)]
pub struct AppState {
    pub backend: BackendFactory,
    pub settings: Arc<SessionSettings>,
}

impl AppState {
    pub fn new(backend: BackendFactory, settings: SessionSettings) -> Self {
        Self {
            backend,
            settings: Arc::new(settings),
        }
    }
}

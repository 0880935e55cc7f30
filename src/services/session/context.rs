/*
 * Responsibility
 * - Request-scoped context: the request's backend client + the resolved user
 * - Created by the session middleware, stored in request extensions,
 *   handed to handlers through the `SessionCtx` extractor
 * - Never outlives the request
 */
use std::sync::Arc;

use parking_lot::Mutex;

use crate::services::backend::{BackendClient, UserRecord};

#[derive(Clone, Debug)]
pub struct RequestContext {
    backend: BackendClient,
    user: Arc<Mutex<Option<UserRecord>>>,
}

impl RequestContext {
    pub fn new(backend: BackendClient, user: Option<UserRecord>) -> Self {
        Self {
            backend,
            user: Arc::new(Mutex::new(user)),
        }
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.user.lock().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.lock().is_some()
    }

    pub fn set_user(&self, user: UserRecord) {
        *self.user.lock() = Some(user);
    }

    pub fn clear_user(&self) {
        *self.user.lock() = None;
    }
}

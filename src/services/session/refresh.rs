//! Session loader + refresher.
//!
//! A failed refresh is not an error for the request: the session is dropped and the
//! request continues unauthenticated. No retry.

use tracing::{debug, warn};

use crate::services::backend::{BackendClient, USERS_COLLECTION, UserRecord};

/// Restore the auth store from `cookie_header` and, if the token looks valid, refresh it.
///
/// Returns a detached copy of the refreshed user record.
pub async fn restore_session(
    client: &BackendClient,
    cookie_header: &str,
    cookie_name: &str,
) -> Option<UserRecord> {
    let store = client.auth_store();
    store.load_from_cookie(cookie_header, cookie_name);

    if !store.is_valid() {
        if !store.token().is_empty() {
            debug!("auth token is malformed or expired, skipping refresh");
        }
        return None;
    }

    match client.collection(USERS_COLLECTION).auth_refresh().await {
        Ok(_) => {
            let user = store.model();
            debug!(
                user_id = user.as_ref().and_then(UserRecord::id).unwrap_or_default(),
                "session refreshed"
            );
            user
        }
        Err(err) => {
            warn!(
                error = %err,
                backend = client.backend_name(),
                "session refresh failed, clearing auth"
            );
            store.clear();
            None
        }
    }
}

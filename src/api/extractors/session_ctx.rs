use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::session::RequestContext;
use crate::state::AppState;

/// Handler access to the request's session context.
///
/// The session middleware inserts `RequestContext` into the extensions before any page
/// handler runs. Missing means the route was mounted outside the pipeline: 500.
pub struct SessionCtx(pub RequestContext);

impl FromRequestParts<AppState> for SessionCtx
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<RequestContext>() {
            Some(ctx) => Ok(SessionCtx(ctx.clone())),
            None => {
                tracing::error!(
                    path = %parts.uri.path(),
                    "session context missing; route is not behind the session middleware"
                );
                Err(AppError::Internal)
            }
        }
    }
}

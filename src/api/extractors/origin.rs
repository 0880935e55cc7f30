use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

use crate::error::AppError;
use crate::state::AppState;

/// Public origin of the app (`scheme://host[:port]`), used to build OAuth2 callback URLs.
///
/// Resolution order:
/// 1. `PUBLIC_BASE_URL` from config
/// 2. `X-Forwarded-Proto` (default `http`) + `Host`
/// 3. the request URI authority (absolute-form requests)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(pub String);

fn forwarded_proto(headers: &HeaderMap) -> &'static str {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        // proxies may append: "https, http"
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase());

    match proto.as_deref() {
        Some("https") => "https",
        _ => "http",
    }
}

impl FromRequestParts<AppState> for RequestOrigin
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(base) = &state.settings.public_base_url {
            return Ok(RequestOrigin(base.clone()));
        }

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .ok_or_else(|| {
                AppError::bad_request("MISSING_HOST", "cannot determine request origin")
            })?;

        Ok(RequestOrigin(format!(
            "{}://{}",
            forwarded_proto(&parts.headers),
            host
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;

    use super::*;
    use crate::services::{
        backend::{BackendFactory, fake::FakeAuthApi},
        session::SessionSettings,
    };

    fn state(public_base_url: Option<&str>) -> AppState {
        let settings = SessionSettings {
            public_base_url: public_base_url.map(str::to_owned),
            ..SessionSettings::default()
        };
        AppState::new(BackendFactory::new(Arc::new(FakeAuthApi::new())), settings)
    }

    async fn resolve(req: Request<()>, state: &AppState) -> Result<RequestOrigin, AppError> {
        let (mut parts, _) = req.into_parts();
        RequestOrigin::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn forwarded_proto_and_host() {
        let req = Request::get("/login")
            .header(header::HOST, "app.example")
            .header("x-forwarded-proto", "https")
            .body(())
            .unwrap();

        let origin = resolve(req, &state(None)).await.unwrap();
        assert_eq!(origin, RequestOrigin("https://app.example".into()));
    }

    #[tokio::test]
    async fn defaults_to_http_and_keeps_port() {
        let req = Request::get("/login")
            .header(header::HOST, "localhost:3000")
            .header("x-forwarded-proto", "gopher")
            .body(())
            .unwrap();

        let origin = resolve(req, &state(None)).await.unwrap();
        assert_eq!(origin.0, "http://localhost:3000");
    }

    #[tokio::test]
    async fn first_forwarded_proto_wins() {
        let req = Request::get("/login")
            .header(header::HOST, "app.example")
            .header("x-forwarded-proto", "HTTPS, http")
            .body(())
            .unwrap();

        assert_eq!(resolve(req, &state(None)).await.unwrap().0, "https://app.example");
    }

    #[tokio::test]
    async fn configured_base_url_wins() {
        let req = Request::get("/login")
            .header(header::HOST, "internal:8080")
            .body(())
            .unwrap();

        let origin = resolve(req, &state(Some("https://app.example"))).await.unwrap();
        assert_eq!(origin.0, "https://app.example");
    }

    #[tokio::test]
    async fn missing_host_is_a_bad_request() {
        let req = Request::get("/login").body(()).unwrap();
        let err = resolve(req, &state(None)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { code: "MISSING_HOST", .. }));
    }
}

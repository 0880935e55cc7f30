use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, de::DeserializeOwned};
use url::Url;

use crate::services::backend::client::{
    AuthApi, AuthMethodsList, AuthResponse, BackendError, BackendResult, OAuth2Exchange,
};

/// HTTP transport for a PocketBase-compatible backend.
///
/// One instance is shared by all requests; the underlying `reqwest::Client` keeps its own
/// connection pool. No timeout is configured beyond the transport defaults.
#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    http: reqwest::Client,
    base_url: Url,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl HttpAuthApi {
    // `base_url` like `http://127.0.0.1:8090` (a path prefix is allowed)
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(e.to_string()))?;

        // Url::join drops the last path segment unless it ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, collection: &str, action: &str) -> BackendResult<Url> {
        self.base_url
            .join(&format!("api/collections/{collection}/{action}"))
            .map_err(|e| BackendError::InvalidUrl(e.to_string()))
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> BackendResult<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);
        return Err(BackendError::Status {
            status: status.as_u16(),
            message,
        });
    }

    resp.json::<T>()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))
}

fn transport(e: reqwest::Error) -> BackendError {
    BackendError::Transport(e.to_string())
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    fn backend_name(&self) -> &'static str {
        "pocketbase"
    }

    async fn auth_refresh(&self, collection: &str, token: &str) -> BackendResult<AuthResponse> {
        // The backend expects the raw token, without a `Bearer` scheme.
        let resp = self
            .http
            .post(self.endpoint(collection, "auth-refresh")?)
            .header(header::AUTHORIZATION, token)
            .send()
            .await
            .map_err(transport)?;

        decode(resp).await
    }

    async fn list_auth_methods(&self, collection: &str) -> BackendResult<AuthMethodsList> {
        let resp = self
            .http
            .get(self.endpoint(collection, "auth-methods")?)
            .send()
            .await
            .map_err(transport)?;

        decode(resp).await
    }

    async fn auth_with_oauth2(
        &self,
        collection: &str,
        exchange: &OAuth2Exchange,
    ) -> BackendResult<AuthResponse> {
        let resp = self
            .http
            .post(self.endpoint(collection, "auth-with-oauth2")?)
            .json(exchange)
            .send()
            .await
            .map_err(transport)?;

        decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
    };
    use serde_json::{Value, json};

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    fn backend() -> Router {
        let collection = Router::new()
            .route(
                "/auth-refresh",
                post(|headers: HeaderMap| async move {
                    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                        Some("good-token") => Json(json!({
                            "token": "rotated-token",
                            "record": {"id": "u1", "email": "u1@example.com"}
                        }))
                        .into_response(),
                        _ => (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"code": 401, "message": "invalid token", "data": {}})),
                        )
                            .into_response(),
                    }
                }),
            )
            .route(
                "/auth-methods",
                get(|| async {
                    Json(json!({
                        "usernamePassword": false,
                        "emailPassword": true,
                        "authProviders": [{
                            "name": "github",
                            "displayName": "GitHub",
                            "state": "abc",
                            "codeVerifier": "v",
                            "codeChallenge": "c",
                            "codeChallengeMethod": "S256",
                            "authUrl": "https://gh/auth?"
                        }]
                    }))
                }),
            )
            .route(
                "/auth-with-oauth2",
                post(|Json(body): Json<Value>| async move {
                    if body["code"] == json!("good-code") && body["codeVerifier"] == json!("v") {
                        Json(json!({
                            "token": "oauth-token",
                            "model": {"id": "u9"},
                            "meta": {}
                        }))
                        .into_response()
                    } else {
                        (StatusCode::BAD_REQUEST, "plain failure").into_response()
                    }
                }),
            );

        Router::new().nest("/pb/api/collections/users", collection)
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            HttpAuthApi::new("not a url"),
            Err(BackendError::InvalidUrl(_))
        ));
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let api = HttpAuthApi::new("http://backend.local/pb").unwrap();
        assert_eq!(
            api.endpoint("users", "auth-refresh").unwrap().as_str(),
            "http://backend.local/pb/api/collections/users/auth-refresh"
        );
    }

    #[tokio::test]
    async fn auth_refresh_sends_raw_token() {
        let base = serve(backend()).await;
        let api = HttpAuthApi::new(&format!("{base}/pb")).unwrap();

        let resp = api.auth_refresh("users", "good-token").await.unwrap();
        assert_eq!(resp.token, "rotated-token");
        assert_eq!(resp.record.id(), Some("u1"));
    }

    #[tokio::test]
    async fn auth_refresh_maps_error_status_and_message() {
        let base = serve(backend()).await;
        let api = HttpAuthApi::new(&format!("{base}/pb")).unwrap();

        let err = api.auth_refresh("users", "bad-token").await.unwrap_err();
        match err {
            BackendError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_auth_methods_decodes_providers() {
        let base = serve(backend()).await;
        let api = HttpAuthApi::new(&format!("{base}/pb/")).unwrap();

        let methods = api.list_auth_methods("users").await.unwrap();
        assert_eq!(methods.auth_providers.len(), 1);
        let github = &methods.auth_providers[0];
        assert_eq!(github.name, "github");
        assert_eq!(github.display_name.as_deref(), Some("GitHub"));
        assert_eq!(github.auth_url, "https://gh/auth?");
        assert_eq!(github.code_verifier, "v");
    }

    #[tokio::test]
    async fn auth_with_oauth2_posts_camel_case_body() {
        let base = serve(backend()).await;
        let api = HttpAuthApi::new(&format!("{base}/pb")).unwrap();

        let mut exchange = OAuth2Exchange {
            provider: "github".into(),
            code: "good-code".into(),
            code_verifier: "v".into(),
            redirect_url: "https://app.example/auth/callback".into(),
        };
        let resp = api.auth_with_oauth2("users", &exchange).await.unwrap();
        assert_eq!(resp.token, "oauth-token");
        assert_eq!(resp.record.id(), Some("u9"));

        exchange.code = "bad-code".into();
        let err = api.auth_with_oauth2("users", &exchange).await.unwrap_err();
        match err {
            BackendError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "plain failure");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpAuthApi::new(&format!("http://{addr}")).unwrap();
        assert!(matches!(
            api.list_auth_methods("users").await,
            Err(BackendError::Transport(_))
        ));
    }
}

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Result of a pipeline step or an auth handler.
///
/// Redirects are plain values; whoever drives the request turns them into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    RedirectTo { location: String, status: StatusCode },
}

impl Outcome {
    /// `303 See Other` to `location`.
    pub fn redirect_to(location: impl Into<String>) -> Self {
        Self::RedirectTo {
            location: location.into(),
            status: StatusCode::SEE_OTHER,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Continue => None,
            Self::RedirectTo { location, .. } => Some(location),
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Continue => StatusCode::NO_CONTENT.into_response(),
            Outcome::RedirectTo { location, status } => {
                (status, [(header::LOCATION, location)]).into_response()
            }
        }
    }
}

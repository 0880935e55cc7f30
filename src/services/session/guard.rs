use crate::services::backend::UserRecord;
use crate::services::session::outcome::Outcome;

/// Target of every "not logged in" redirect (guard and failed OAuth2 callbacks).
pub const LOGIN_PATH: &str = "/login";

/// Redirects unauthenticated requests under one protected prefix to the login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    protected_prefix: String,
}

impl RouteGuard {
    pub fn new(protected_prefix: impl Into<String>) -> Self {
        Self {
            protected_prefix: protected_prefix.into(),
        }
    }

    pub fn protected_prefix(&self) -> &str {
        &self.protected_prefix
    }

    // Plain string prefix: `/dashboard` also covers `/dashboard-old`.
    pub fn protects(&self, path: &str) -> bool {
        path.starts_with(&self.protected_prefix)
    }

    pub fn check(&self, path: &str, user: Option<&UserRecord>) -> Outcome {
        if self.protects(path) && user.is_none() {
            return Outcome::redirect_to(LOGIN_PATH);
        }
        Outcome::Continue
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new("/dashboard")
    }
}

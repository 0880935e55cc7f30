/*
 * Responsibility
 * - Login page data (what the UI needs to render the provider link)
 */
use serde::Serialize;

use crate::services::oauth::LoginLink;

/// All fields are `""` when no provider is usable; the page then renders without a link.
#[derive(Debug, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginPageData {
    pub auth_provider_redirect: String,
    pub auth_provider_state: String,
    pub auth_provider_name: String,
}

impl From<LoginLink> for LoginPageData {
    fn from(link: LoginLink) -> Self {
        Self {
            auth_provider_redirect: link.redirect,
            auth_provider_state: link.state,
            auth_provider_name: link.provider,
        }
    }
}

/*
 * Responsibility
 * - Root layout data: current user + logged-in flag
 */
use serde::Serialize;

use crate::services::{backend::UserRecord, session::RequestContext};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutData {
    pub user: Option<UserRecord>,
    pub is_logged_in: bool,
}

impl From<&RequestContext> for LayoutData {
    fn from(ctx: &RequestContext) -> Self {
        Self {
            user: ctx.user(),
            is_logged_in: ctx.is_logged_in(),
        }
    }
}

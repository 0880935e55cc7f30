/*
 * Responsibility
 * - Request-derived values handed to handlers (session context, public origin)
 */
mod origin;
mod session_ctx;

pub use origin::RequestOrigin;
pub use session_ctx::SessionCtx;

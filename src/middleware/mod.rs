/*
 * Responsibility
 * - Public surface of the middleware (re-export)
 * - pub fn apply(...) per concern: http, security_headers, session
 */
pub mod http;
pub mod security_headers;
pub mod session;

pub mod backend;
pub mod oauth;
pub mod session;

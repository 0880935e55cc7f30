/*
 * Responsibility
 * - Per-request session sequencing: load → refresh → guard → (handler) → cookie write
 * - Framework-light building blocks; the axum wiring lives in middleware::session
 */
pub mod context;
pub mod cookie;
pub mod guard;
pub mod outcome;
pub mod refresh;
pub mod settings;

pub use context::RequestContext;
pub use outcome::Outcome;
pub use settings::SessionSettings;

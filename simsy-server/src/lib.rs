//! HTTP surface of the Simsy catalog: shared state, error mapping,
//! authentication middleware, handlers and the versioned router.

pub mod handlers;
pub mod infra;
pub mod media;
pub mod middleware;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::errors::{AppError, AppResult};
pub use infra::startup::create_app;

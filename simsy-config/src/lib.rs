//! Configuration for the Simsy server.
//!
//! Values are composed from a `.env` file, an optional `simsy.toml` and the
//! process environment (which wins), then checked by
//! [`validation::apply_guard_rails`] before the server starts.
#![allow(missing_docs)]

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    MediaConfig, ServerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};

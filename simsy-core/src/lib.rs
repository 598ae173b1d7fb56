//! # Simsy Core
//!
//! Business logic for the Simsy catalog backend.
//!
//! - [`progress`]: the per-user reached-position state machine
//! - [`history`]: viewing history ordering
//! - [`application`]: catalog, tracking and account services over an
//!   [`application::AppUnitOfWork`]
//! - [`database`]: repository ports with PostgreSQL and in-memory adapters
//! - [`auth`]: password hashing and opaque token handling
//! - [`api`]: route constants and transport types shared with the server
#![allow(missing_docs)]

pub mod api;
pub mod application;
pub mod auth;
pub mod database;
pub mod error;
pub mod history;
pub mod progress;

pub use error::{CoreError, Result};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

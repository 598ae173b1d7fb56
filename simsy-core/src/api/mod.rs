//! Transport-facing routes and DTOs.

pub mod routes;
pub mod types;

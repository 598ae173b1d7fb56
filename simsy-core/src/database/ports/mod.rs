//! Repository ports grouped by bounded context. Postgres adapters live in
//! [`super::postgres`], in-memory ones in [`super::memory`].

pub mod artists;
pub mod countries;
pub mod progress;
pub mod sessions;
pub mod shows;
pub mod taxonomy;
pub mod user_lists;
pub mod users;

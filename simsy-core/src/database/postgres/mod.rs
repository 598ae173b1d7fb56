mod artists;
mod countries;
mod progress;
mod sessions;
mod shows;
mod taxonomy;
mod user_lists;
mod users;

pub use artists::PostgresArtistsRepository;
pub use countries::PostgresCountriesRepository;
pub use progress::PostgresProgressRepository;
pub use sessions::PostgresSessionsRepository;
pub use shows::PostgresShowsRepository;
pub use taxonomy::PostgresTaxonomyRepository;
pub use user_lists::PostgresUserListsRepository;
pub use users::PostgresUsersRepository;

use std::fmt;
use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::error::{CoreError, Result};

/// Owns the connection pool shared by every Postgres repository.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    max_connections: u32,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(url)
            .await?;

        info!(max_connections, "database pool initialized");
        Ok(Self {
            pool,
            max_connections,
        })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let max_connections = pool.options().get_max_connections();
        Self {
            pool,
            max_connections,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| CoreError::Internal(format!("Migration failed: {e}")))?;
        info!("database migrations applied");
        Ok(())
    }
}

/// Map a query failure to a core error, surfacing constraint violations as
/// client errors.
pub(crate) fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |e| {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_foreign_key_violation() {
                return CoreError::InvalidInput(format!(
                    "{context}: referenced record does not exist"
                ));
            }
            if db_err.is_unique_violation() {
                return CoreError::Conflict(format!("{context}: already exists"));
            }
        }
        CoreError::Internal(format!("{context}: {e}"))
    }
}

pub(crate) fn raw_ids<T: Copy + Into<i64>>(ids: &[T]) -> Vec<i64> {
    ids.iter().map(|id| (*id).into()).collect()
}

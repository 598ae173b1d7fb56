use std::{fmt, sync::Arc};

use chrono::Duration;
use simsy_config::Config;
use simsy_core::application::{
    AccountService, AppUnitOfWork, CatalogService, TrackingService,
};
use simsy_core::auth::AuthCrypto;
use simsy_core::database::PostgresDatabase;

use crate::media::ImageStore;

#[derive(Clone)]
pub struct AppState {
    /// `None` when running on the in-memory adapters.
    pub postgres: Option<Arc<PostgresDatabase>>,
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogService>,
    pub tracking: Arc<TrackingService>,
    pub accounts: Arc<AccountService>,
    pub images: Arc<ImageStore>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("postgres", &self.postgres.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        unit_of_work: AppUnitOfWork,
        postgres: Option<Arc<PostgresDatabase>>,
        crypto: AuthCrypto,
    ) -> Self {
        let accounts = AccountService::new(
            unit_of_work.clone(),
            Arc::new(crypto),
            Duration::hours(config.auth.session_lifetime_hours),
        )
        .with_first_user_staff(config.auth.first_user_is_staff);

        Self {
            catalog: Arc::new(CatalogService::new(unit_of_work.clone())),
            tracking: Arc::new(TrackingService::new(unit_of_work)),
            accounts: Arc::new(accounts),
            images: Arc::new(ImageStore::new(config.media.root.clone())),
            postgres,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage_label(&self) -> &'static str {
        if self.postgres.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }
}

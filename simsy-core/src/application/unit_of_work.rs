use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::ports::{
    artists::ArtistsRepository, countries::CountriesRepository,
    progress::ProgressRepository, sessions::SessionsRepository,
    shows::ShowsRepository, taxonomy::TaxonomyRepository,
    user_lists::UserListsRepository, users::UsersRepository,
};
use crate::database::{
    InMemoryDatabase, PostgresDatabase,
    postgres::{
        PostgresArtistsRepository, PostgresCountriesRepository,
        PostgresProgressRepository, PostgresSessionsRepository,
        PostgresShowsRepository, PostgresTaxonomyRepository,
        PostgresUserListsRepository, PostgresUsersRepository,
    },
};

/// Aggregates all repository ports used by application services.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub taxonomy: Arc<dyn TaxonomyRepository>,
    pub countries: Arc<dyn CountriesRepository>,
    pub artists: Arc<dyn ArtistsRepository>,
    pub shows: Arc<dyn ShowsRepository>,

    pub user_lists: Arc<dyn UserListsRepository>,
    pub progress: Arc<dyn ProgressRepository>,

    pub users: Arc<dyn UsersRepository>,
    pub sessions: Arc<dyn SessionsRepository>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("taxonomy", &type_name_of_val(self.taxonomy.as_ref()))
            .field("countries", &type_name_of_val(self.countries.as_ref()))
            .field("artists", &type_name_of_val(self.artists.as_ref()))
            .field("shows", &type_name_of_val(self.shows.as_ref()))
            .field("user_lists", &type_name_of_val(self.user_lists.as_ref()))
            .field("progress", &type_name_of_val(self.progress.as_ref()))
            .field("users", &type_name_of_val(self.users.as_ref()))
            .field("sessions", &type_name_of_val(self.sessions.as_ref()))
            .finish()
    }
}

impl AppUnitOfWork {
    /// Compose all Postgres-backed repositories.
    pub fn from_postgres(db: &PostgresDatabase) -> Result<Self, String> {
        AppUnitOfWorkBuilder::new().with_postgres(db).build()
    }

    /// Compose every port over one shared in-memory store.
    pub fn in_memory() -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        AppUnitOfWork {
            taxonomy: db.clone(),
            countries: db.clone(),
            artists: db.clone(),
            shows: db.clone(),
            user_lists: db.clone(),
            progress: db.clone(),
            users: db.clone(),
            sessions: db,
        }
    }
}

#[derive(Default)]
pub struct AppUnitOfWorkBuilder {
    taxonomy: Option<Arc<dyn TaxonomyRepository>>,
    countries: Option<Arc<dyn CountriesRepository>>,
    artists: Option<Arc<dyn ArtistsRepository>>,
    shows: Option<Arc<dyn ShowsRepository>>,
    user_lists: Option<Arc<dyn UserListsRepository>>,
    progress: Option<Arc<dyn ProgressRepository>>,
    users: Option<Arc<dyn UsersRepository>>,
    sessions: Option<Arc<dyn SessionsRepository>>,
}

impl fmt::Debug for AppUnitOfWorkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWorkBuilder")
            .field("taxonomy", &self.taxonomy.is_some())
            .field("countries", &self.countries.is_some())
            .field("artists", &self.artists.is_some())
            .field("shows", &self.shows.is_some())
            .field("user_lists", &self.user_lists.is_some())
            .field("progress", &self.progress.is_some())
            .field("users", &self.users.is_some())
            .field("sessions", &self.sessions.is_some())
            .finish()
    }
}

impl AppUnitOfWorkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taxonomy(mut self, repo: Arc<dyn TaxonomyRepository>) -> Self {
        self.taxonomy = Some(repo);
        self
    }
    pub fn with_countries(mut self, repo: Arc<dyn CountriesRepository>) -> Self {
        self.countries = Some(repo);
        self
    }
    pub fn with_artists(mut self, repo: Arc<dyn ArtistsRepository>) -> Self {
        self.artists = Some(repo);
        self
    }
    pub fn with_shows(mut self, repo: Arc<dyn ShowsRepository>) -> Self {
        self.shows = Some(repo);
        self
    }
    pub fn with_user_lists(mut self, repo: Arc<dyn UserListsRepository>) -> Self {
        self.user_lists = Some(repo);
        self
    }
    pub fn with_progress(mut self, repo: Arc<dyn ProgressRepository>) -> Self {
        self.progress = Some(repo);
        self
    }
    pub fn with_users(mut self, repo: Arc<dyn UsersRepository>) -> Self {
        self.users = Some(repo);
        self
    }
    pub fn with_sessions(mut self, repo: Arc<dyn SessionsRepository>) -> Self {
        self.sessions = Some(repo);
        self
    }

    /// Populate the builder with Postgres-backed repository adapters.
    pub fn with_postgres(self, db: &PostgresDatabase) -> Self {
        let pool = db.pool().clone();
        self.with_taxonomy(Arc::new(PostgresTaxonomyRepository::new(pool.clone())))
            .with_countries(Arc::new(PostgresCountriesRepository::new(pool.clone())))
            .with_artists(Arc::new(PostgresArtistsRepository::new(pool.clone())))
            .with_shows(Arc::new(PostgresShowsRepository::new(pool.clone())))
            .with_user_lists(Arc::new(PostgresUserListsRepository::new(pool.clone())))
            .with_progress(Arc::new(PostgresProgressRepository::new(pool.clone())))
            .with_users(Arc::new(PostgresUsersRepository::new(pool.clone())))
            .with_sessions(Arc::new(PostgresSessionsRepository::new(pool)))
    }

    /// Build a validated AppUnitOfWork. Returns a string error naming the
    /// first missing repository.
    pub fn build(self) -> Result<AppUnitOfWork, String> {
        Ok(AppUnitOfWork {
            taxonomy: self
                .taxonomy
                .ok_or_else(|| "missing TaxonomyRepository".to_string())?,
            countries: self
                .countries
                .ok_or_else(|| "missing CountriesRepository".to_string())?,
            artists: self
                .artists
                .ok_or_else(|| "missing ArtistsRepository".to_string())?,
            shows: self
                .shows
                .ok_or_else(|| "missing ShowsRepository".to_string())?,
            user_lists: self
                .user_lists
                .ok_or_else(|| "missing UserListsRepository".to_string())?,
            progress: self
                .progress
                .ok_or_else(|| "missing ProgressRepository".to_string())?,
            users: self
                .users
                .ok_or_else(|| "missing UsersRepository".to_string())?,
            sessions: self
                .sessions
                .ok_or_else(|| "missing SessionsRepository".to_string())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_reports_the_missing_port() {
        let err = AppUnitOfWorkBuilder::new().build().unwrap_err();
        assert_eq!(err, "missing TaxonomyRepository");
    }

    #[tokio::test]
    async fn in_memory_ports_share_one_store() {
        use simsy_model::{ShowDraft, UserList};

        let uow = AppUnitOfWork::in_memory();
        let show = uow.shows.create(&ShowDraft::named("Heat")).await.unwrap();
        let user = uuid::Uuid::now_v7();

        assert!(uow.user_lists.toggle(user, show.id, UserList::Favorites).await.unwrap());
        assert!(uow.shows.delete(show.id).await.unwrap());
        assert!(
            uow.user_lists
                .show_ids(user, UserList::Favorites)
                .await
                .unwrap()
                .is_empty()
        );
    }
}

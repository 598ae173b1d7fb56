pub mod accounts;
pub mod catalog;
pub mod tracking;
pub mod unit_of_work;

pub use accounts::{AccountService, RegisterRequest, Session};
pub use catalog::{
    ArtistDetail, ArtistView, CatalogService, CountryDetail, SearchHit,
    ShowDetail, TaxonomyDetail,
};
pub use tracking::{
    EpisodeFrom, ListToggle, ProgressUpdate, ProgressUpdated, ShowUserState,
    TrackingService,
};
pub use unit_of_work::{AppUnitOfWork, AppUnitOfWorkBuilder};

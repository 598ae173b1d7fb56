//! Per-user progress tracking for shows.
//!
//! A user's position in a show is a [`ShowProgress`] document: the playback
//! time reached for a film, or the current season/episode plus a resume time
//! per visited episode for series and programs. [`navigate`] moves a position
//! across episode and season boundaries and [`change_episode`] applies the
//! move to a stored document.
//!
//! Everything here is pure; persistence lives behind
//! [`crate::database::ports::progress::ProgressRepository`].

mod change;
mod navigation;
mod reached;

pub use change::{EpisodeChange, change_episode};
pub use navigation::{Navigation, NavigationOutcome, navigate};
pub use reached::{ReachedView, ShowProgress};

use simsy_model::SeasonEpisode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("Show has no episodes")]
    NoEpisodes,

    #[error("Position {0} is outside the show's episodes")]
    OutOfRange(SeasonEpisode),

    #[error("Films have no episodes to navigate")]
    NotEpisodic,

    #[error("Unknown navigation '{0}'")]
    UnknownNavigation(String),
}

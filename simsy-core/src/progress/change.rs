use serde::{Deserialize, Serialize};
use simsy_model::{EpisodeCounts, SeasonEpisode, ShowKind};

use super::{Navigation, ProgressError, ShowProgress, navigate};

/// Result of moving a user to another episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeChange {
    pub message: String,
    pub new_season: u32,
    pub new_episode: u32,
    pub changed: bool,
    /// Resume point stored for the destination episode.
    pub starting_time: u64,
}

/// Apply `nav` to a user's stored progress.
///
/// The move starts from `from` when given, otherwise from the stored
/// position (or the first episode when nothing is stored yet). Returns the
/// updated document to persist alongside the change report.
pub fn change_episode(
    kind: ShowKind,
    counts: &EpisodeCounts,
    stored: Option<ShowProgress>,
    from: Option<SeasonEpisode>,
    nav: Navigation,
) -> Result<(ShowProgress, EpisodeChange), ProgressError> {
    if !kind.is_episodic() {
        return Err(ProgressError::NotEpisodic);
    }

    let mut progress = stored
        .filter(|p| p.matches(kind))
        .unwrap_or_else(|| ShowProgress::initial(kind));
    let current = from
        .or_else(|| progress.position())
        .unwrap_or(SeasonEpisode::FIRST);

    let outcome = navigate(counts, current, nav)?;
    let starting_time = progress.record(kind, outcome.position, None);

    Ok((
        progress,
        EpisodeChange {
            message: outcome.message.to_string(),
            new_season: outcome.position.season,
            new_episode: outcome.position.episode,
            changed: outcome.changed,
            starting_time,
        },
    ))
}

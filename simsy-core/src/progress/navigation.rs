use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use simsy_model::{EpisodeCounts, SeasonEpisode};

use super::ProgressError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    First,
    Previous,
    Next,
    Last,
}

impl Navigation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Navigation::First => "first",
            Navigation::Previous => "previous",
            Navigation::Next => "next",
            Navigation::Last => "last",
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Navigation {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Navigation::First),
            "previous" => Ok(Navigation::Previous),
            "next" => Ok(Navigation::Next),
            "last" => Ok(Navigation::Last),
            other => Err(ProgressError::UnknownNavigation(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    pub position: SeasonEpisode,
    /// False only when the move hit the first or last episode boundary.
    pub changed: bool,
    pub message: &'static str,
}

impl NavigationOutcome {
    fn moved(position: SeasonEpisode, message: &'static str) -> Self {
        Self {
            position,
            changed: true,
            message,
        }
    }

    fn stayed(position: SeasonEpisode, message: &'static str) -> Self {
        Self {
            position,
            changed: false,
            message,
        }
    }
}

/// Compute the destination of `nav` from `current`.
///
/// `First` and `Last` ignore `current`; the relative moves require it to lie
/// inside `counts`.
pub fn navigate(
    counts: &EpisodeCounts,
    current: SeasonEpisode,
    nav: Navigation,
) -> Result<NavigationOutcome, ProgressError> {
    let last = counts.last().ok_or(ProgressError::NoEpisodes)?;

    match nav {
        Navigation::First => Ok(NavigationOutcome::moved(
            SeasonEpisode::FIRST,
            "First Episode of the show!",
        )),
        Navigation::Last => {
            Ok(NavigationOutcome::moved(last, "Last episode of the show!"))
        }
        Navigation::Previous => {
            ensure_in_range(counts, current)?;
            if current == SeasonEpisode::FIRST {
                return Ok(NavigationOutcome::stayed(
                    current,
                    "Already the first episode of first season!",
                ));
            }
            if current.episode == 1 {
                let season = current.season - 1;
                let episode = counts
                    .episodes_in(season)
                    .ok_or(ProgressError::OutOfRange(current))?;
                return Ok(NavigationOutcome::moved(
                    SeasonEpisode::new(season, episode),
                    "Back to the last episode of the previous season.",
                ));
            }
            Ok(NavigationOutcome::moved(
                SeasonEpisode::new(current.season, current.episode - 1),
                "Previous episode...",
            ))
        }
        Navigation::Next => {
            ensure_in_range(counts, current)?;
            if current == last {
                return Ok(NavigationOutcome::stayed(
                    current,
                    "Last episode of last season!",
                ));
            }
            let in_season = counts
                .episodes_in(current.season)
                .ok_or(ProgressError::OutOfRange(current))?;
            if current.episode == in_season {
                return Ok(NavigationOutcome::moved(
                    SeasonEpisode::new(current.season + 1, 1),
                    "First episode of the next season.",
                ));
            }
            Ok(NavigationOutcome::moved(
                SeasonEpisode::new(current.season, current.episode + 1),
                "Next Episode...",
            ))
        }
    }
}

fn ensure_in_range(
    counts: &EpisodeCounts,
    current: SeasonEpisode,
) -> Result<(), ProgressError> {
    if counts.contains(current) {
        Ok(())
    } else {
        Err(ProgressError::OutOfRange(current))
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use simsy_model::{SeasonEpisode, ShowKind};

type TimeSlots = BTreeMap<u32, BTreeMap<u32, u64>>;

/// Stored reached position for one user and one show.
///
/// Persisted in the compact document shape:
///
/// - film: `{"t": 1200}`
/// - episodic: `{"s": 2, "e": 3, "t": {"1": {"1": 0}, "2": {"3": 845}}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProgress", into = "RawProgress")]
pub enum ShowProgress {
    Film { time: u64 },
    Episodic { current: SeasonEpisode, times: TimeSlots },
}

/// What a client sees of a user's position in a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachedView {
    pub season_reached: Option<u32>,
    pub episode_reached: Option<u32>,
    pub time_reached: u64,
}

impl ShowProgress {
    pub fn initial(kind: ShowKind) -> Self {
        if kind.is_episodic() {
            let mut progress = ShowProgress::Episodic {
                current: SeasonEpisode::FIRST,
                times: TimeSlots::new(),
            };
            progress.ensure_slot(SeasonEpisode::FIRST);
            progress
        } else {
            ShowProgress::Film { time: 0 }
        }
    }

    /// Whether the document's shape fits a show of `kind`.
    pub fn matches(&self, kind: ShowKind) -> bool {
        matches!(self, ShowProgress::Episodic { .. }) == kind.is_episodic()
    }

    /// Create a zero time slot for `position` if none exists. Films have no
    /// slots and are left untouched.
    pub fn ensure_slot(&mut self, position: SeasonEpisode) {
        if let ShowProgress::Episodic { times, .. } = self {
            times
                .entry(position.season)
                .or_default()
                .entry(position.episode)
                .or_insert(0);
        }
    }

    /// Resume time stored for `position`, or 0 if it was never visited.
    pub fn time_at(&self, position: SeasonEpisode) -> u64 {
        match self {
            ShowProgress::Film { time } => *time,
            ShowProgress::Episodic { times, .. } => times
                .get(&position.season)
                .and_then(|episodes| episodes.get(&position.episode))
                .copied()
                .unwrap_or(0),
        }
    }

    /// Move to `position` and, when `time` is given, store it as the resume
    /// point there. Returns the time now stored for that position.
    ///
    /// A document whose shape no longer matches `kind` is reset first. For
    /// films `position` is ignored.
    pub fn record(
        &mut self,
        kind: ShowKind,
        position: SeasonEpisode,
        time: Option<u64>,
    ) -> u64 {
        if !self.matches(kind) {
            *self = ShowProgress::initial(kind);
        }
        self.ensure_slot(position);

        match self {
            ShowProgress::Film { time: stored } => {
                if let Some(time) = time {
                    *stored = time;
                }
                *stored
            }
            ShowProgress::Episodic { current, times } => {
                *current = position;
                let slot = times
                    .entry(position.season)
                    .or_default()
                    .entry(position.episode)
                    .or_insert(0);
                if let Some(time) = time {
                    *slot = time;
                }
                *slot
            }
        }
    }

    /// Current position; `None` for films.
    pub fn position(&self) -> Option<SeasonEpisode> {
        match self {
            ShowProgress::Film { .. } => None,
            ShowProgress::Episodic { current, .. } => Some(*current),
        }
    }

    pub fn view(&self, kind: ShowKind) -> ReachedView {
        if !self.matches(kind) {
            return ShowProgress::initial(kind).view(kind);
        }
        match self {
            ShowProgress::Film { time } => ReachedView {
                season_reached: None,
                episode_reached: None,
                time_reached: *time,
            },
            ShowProgress::Episodic { current, .. } => ReachedView {
                season_reached: Some(current.season),
                episode_reached: Some(current.episode),
                time_reached: self.time_at(*current),
            },
        }
    }

    /// View of an optional stored document; a missing one reads as
    /// [`ShowProgress::initial`].
    pub fn view_stored(stored: Option<&ShowProgress>, kind: ShowKind) -> ReachedView {
        match stored {
            Some(progress) => progress.view(kind),
            None => ShowProgress::initial(kind).view(kind),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawTime {
    Seconds(u64),
    Slots(BTreeMap<String, BTreeMap<String, u64>>),
}

#[derive(Clone, Serialize, Deserialize)]
struct RawProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    s: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    e: Option<u32>,
    t: RawTime,
}

impl TryFrom<RawProgress> for ShowProgress {
    type Error = String;

    fn try_from(raw: RawProgress) -> Result<Self, Self::Error> {
        match (raw.s, raw.e, raw.t) {
            (None, None, RawTime::Seconds(time)) => Ok(ShowProgress::Film { time }),
            (Some(season), Some(episode), RawTime::Slots(slots)) => {
                let mut times = TimeSlots::new();
                for (season_key, episodes) in slots {
                    let season_no = parse_key(&season_key)?;
                    let entry = times.entry(season_no).or_default();
                    for (episode_key, time) in episodes {
                        entry.insert(parse_key(&episode_key)?, time);
                    }
                }
                Ok(ShowProgress::Episodic {
                    current: SeasonEpisode::new(season, episode),
                    times,
                })
            }
            _ => Err("progress document mixes film and episodic fields".to_string()),
        }
    }
}

impl From<ShowProgress> for RawProgress {
    fn from(progress: ShowProgress) -> Self {
        match progress {
            ShowProgress::Film { time } => RawProgress {
                s: None,
                e: None,
                t: RawTime::Seconds(time),
            },
            ShowProgress::Episodic { current, times } => RawProgress {
                s: Some(current.season),
                e: Some(current.episode),
                t: RawTime::Slots(
                    times
                        .into_iter()
                        .map(|(season, episodes)| {
                            (
                                season.to_string(),
                                episodes
                                    .into_iter()
                                    .map(|(episode, time)| (episode.to_string(), time))
                                    .collect(),
                            )
                        })
                        .collect(),
                ),
            },
        }
    }
}

fn parse_key(key: &str) -> Result<u32, String> {
    key.parse::<u32>()
        .map_err(|_| format!("invalid season/episode key '{key}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(season: u32, episode: u32) -> SeasonEpisode {
        SeasonEpisode::new(season, episode)
    }

    #[test]
    fn initial_documents_use_the_compact_shape() {
        assert_eq!(
            serde_json::to_value(ShowProgress::initial(ShowKind::Film)).unwrap(),
            json!({"t": 0})
        );
        assert_eq!(
            serde_json::to_value(ShowProgress::initial(ShowKind::Series)).unwrap(),
            json!({"s": 1, "e": 1, "t": {"1": {"1": 0}}})
        );
    }

    #[test]
    fn parses_stored_episodic_documents() {
        let stored: ShowProgress = serde_json::from_value(
            json!({"s": 2, "e": 3, "t": {"1": {"1": 40}, "2": {"3": 845}}}),
        )
        .unwrap();
        assert_eq!(stored.position(), Some(at(2, 3)));
        assert_eq!(stored.time_at(at(2, 3)), 845);
        assert_eq!(stored.time_at(at(1, 1)), 40);
        assert_eq!(stored.time_at(at(5, 5)), 0);
    }

    #[test]
    fn rejects_mixed_documents() {
        let mixed = serde_json::from_value::<ShowProgress>(json!({"s": 1, "e": 1, "t": 3}));
        assert!(mixed.is_err());
    }

    #[test]
    fn ensure_slot_never_overwrites() {
        let mut progress = ShowProgress::initial(ShowKind::Series);
        progress.record(ShowKind::Series, at(1, 1), Some(120));
        progress.ensure_slot(at(1, 1));
        assert_eq!(progress.time_at(at(1, 1)), 120);
    }

    #[test]
    fn record_without_time_returns_stored_time() {
        let mut progress = ShowProgress::initial(ShowKind::Program);
        progress.record(ShowKind::Program, at(1, 2), Some(300));
        progress.record(ShowKind::Program, at(1, 1), Some(10));

        let time = progress.record(ShowKind::Program, at(1, 2), None);
        assert_eq!(time, 300);
        assert_eq!(progress.position(), Some(at(1, 2)));
        assert_eq!(progress.time_at(at(1, 1)), 10);
    }

    #[test]
    fn record_zero_time_is_stored() {
        let mut progress = ShowProgress::initial(ShowKind::Film);
        progress.record(ShowKind::Film, SeasonEpisode::FIRST, Some(900));
        assert_eq!(progress.record(ShowKind::Film, SeasonEpisode::FIRST, Some(0)), 0);
    }

    #[test]
    fn kind_change_resets_the_document() {
        let mut progress = ShowProgress::initial(ShowKind::Film);
        progress.record(ShowKind::Film, SeasonEpisode::FIRST, Some(900));

        let time = progress.record(ShowKind::Series, at(1, 2), None);
        assert_eq!(time, 0);
        assert_eq!(progress.position(), Some(at(1, 2)));
        assert_eq!(progress.time_at(at(1, 1)), 0);
    }

    #[test]
    fn view_reports_current_slot() {
        let mut progress = ShowProgress::initial(ShowKind::Series);
        progress.record(ShowKind::Series, at(2, 1), Some(61));
        assert_eq!(
            progress.view(ShowKind::Series),
            ReachedView {
                season_reached: Some(2),
                episode_reached: Some(1),
                time_reached: 61,
            }
        );
        assert_eq!(
            ShowProgress::view_stored(None, ShowKind::Film),
            ReachedView {
                season_reached: None,
                episode_reached: None,
                time_reached: 0,
            }
        );
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::{ArtistID, CountryID, ShowID, TaxonomyID};

pub const SHOW_NAME_MAX: usize = 150;
pub const SHOW_YEAR_MAX: usize = 25;
pub const DEFAULT_IMDB: &str = "IMDB Rating Not Available";

/// What kind of catalog entry a show is. Only films are non-episodic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ShowKind {
    #[default]
    Film,
    Series,
    Program,
}

impl ShowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowKind::Film => "film",
            ShowKind::Series => "series",
            ShowKind::Program => "program",
        }
    }

    /// Display label, e.g. `Series`.
    pub fn title(&self) -> &'static str {
        match self {
            ShowKind::Film => "Film",
            ShowKind::Series => "Series",
            ShowKind::Program => "Program",
        }
    }

    pub fn is_episodic(&self) -> bool {
        !matches!(self, ShowKind::Film)
    }
}

impl fmt::Display for ShowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShowKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "film" => Ok(ShowKind::Film),
            "series" => Ok(ShowKind::Series),
            "program" => Ok(ShowKind::Program),
            other => Err(ModelError::UnknownShowKind(other.to_string())),
        }
    }
}

/// A 1-based season/episode position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
pub struct SeasonEpisode {
    pub season: u32,
    pub episode: u32,
}

impl SeasonEpisode {
    pub const FIRST: SeasonEpisode = SeasonEpisode {
        season: 1,
        episode: 1,
    };

    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }
}

impl fmt::Display for SeasonEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}E{}", self.season, self.episode)
    }
}

/// Number of episodes per season, keyed by season number.
///
/// Serialized as `{"1": 10, "2": 8}`. A valid map has seasons `1..=n` with
/// no gaps and at least one episode in every season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeCounts(BTreeMap<u32, u32>);

impl EpisodeCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from per-season counts in order; index 0 is season 1.
    pub fn from_seasons(counts: &[u32]) -> Self {
        Self(
            counts
                .iter()
                .enumerate()
                .map(|(idx, count)| (idx as u32 + 1, *count))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn season_count(&self) -> u32 {
        self.0.len() as u32
    }

    pub fn episodes_in(&self, season: u32) -> Option<u32> {
        self.0.get(&season).copied()
    }

    pub fn total_episodes(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn contains(&self, position: SeasonEpisode) -> bool {
        self.episodes_in(position.season)
            .is_some_and(|count| position.episode >= 1 && position.episode <= count)
    }

    /// The final episode of the final season, if any seasons exist.
    pub fn last(&self) -> Option<SeasonEpisode> {
        self.0
            .iter()
            .next_back()
            .map(|(season, count)| SeasonEpisode::new(*season, *count))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().map(|(s, c)| (*s, *c))
    }

    pub fn validate(&self) -> Result<()> {
        for (expected, (season, count)) in (1u32..).zip(self.0.iter()) {
            if *season != expected {
                return Err(ModelError::InvalidEpisodeCounts(format!(
                    "seasons must be numbered from 1 without gaps; expected season {expected}, found {season}"
                )));
            }
            if *count == 0 {
                return Err(ModelError::InvalidEpisodeCounts(format!(
                    "season {season} has no episodes"
                )));
            }
        }
        Ok(())
    }
}

/// Persisted catalog record for a film, series or program. Relations are held
/// as id lists; nested detail views are composed in the core crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: ShowID,
    pub name: String,
    /// Release year; may carry a range such as `2019-2022`.
    pub year: String,
    pub kind: ShowKind,
    pub sample: bool,
    pub captions: bool,
    pub image: Option<String>,
    pub imdb: String,
    pub description: String,
    pub country_ids: Vec<CountryID>,
    pub language_ids: Vec<TaxonomyID>,
    pub genre_ids: Vec<TaxonomyID>,
    pub label_ids: Vec<TaxonomyID>,
    pub rating_id: Option<TaxonomyID>,
    pub artist_ids: Vec<ArtistID>,
    pub episodes: EpisodeCounts,
    pub finalized: bool,
    pub popup: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Show {
    /// Years since release, computed from the first four characters of `year`.
    pub fn age(&self) -> Option<i32> {
        let start: String = self.year.chars().take(4).collect();
        start
            .parse::<i32>()
            .ok()
            .map(|year| crate::current_year() - year)
    }

    /// Build a new record from a validated draft.
    pub fn from_draft(id: ShowID, draft: ShowDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            year: draft.year,
            kind: draft.kind,
            sample: draft.sample,
            captions: draft.captions,
            image: None,
            imdb: draft.imdb,
            description: draft.description,
            country_ids: draft.country_ids,
            language_ids: draft.language_ids,
            genre_ids: draft.genre_ids,
            label_ids: draft.label_ids,
            rating_id: draft.rating_id,
            artist_ids: draft.artist_ids,
            episodes: draft.episodes,
            finalized: draft.finalized,
            popup: draft.popup,
            created: now,
            updated: now,
        }
    }

    /// Replace editable fields from a draft, keeping id, image and `created`.
    pub fn apply_draft(&mut self, draft: ShowDraft, now: DateTime<Utc>) {
        let image = self.image.take();
        let created = self.created;
        *self = Self::from_draft(self.id, draft, now);
        self.image = image;
        self.created = created;
    }
}

fn default_year() -> String {
    crate::current_year().to_string()
}

fn default_imdb() -> String {
    DEFAULT_IMDB.to_string()
}

/// Input for creating or replacing a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowDraft {
    pub name: String,
    #[serde(default = "default_year")]
    pub year: String,
    #[serde(default)]
    pub kind: ShowKind,
    #[serde(default)]
    pub sample: bool,
    #[serde(default)]
    pub captions: bool,
    #[serde(default = "default_imdb")]
    pub imdb: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub country_ids: Vec<CountryID>,
    #[serde(default)]
    pub language_ids: Vec<TaxonomyID>,
    #[serde(default)]
    pub genre_ids: Vec<TaxonomyID>,
    #[serde(default)]
    pub label_ids: Vec<TaxonomyID>,
    #[serde(default)]
    pub rating_id: Option<TaxonomyID>,
    #[serde(default)]
    pub artist_ids: Vec<ArtistID>,
    #[serde(default)]
    pub episodes: EpisodeCounts,
    #[serde(default)]
    pub finalized: bool,
    #[serde(default)]
    pub popup: String,
}

impl ShowDraft {
    /// A film draft with defaults everywhere except the name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            year: default_year(),
            kind: ShowKind::Film,
            sample: false,
            captions: false,
            imdb: default_imdb(),
            description: String::new(),
            country_ids: Vec::new(),
            language_ids: Vec::new(),
            genre_ids: Vec::new(),
            label_ids: Vec::new(),
            rating_id: None,
            artist_ids: Vec::new(),
            episodes: EpisodeCounts::new(),
            finalized: false,
            popup: String::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ModelError::invalid_field("name", "must not be empty"));
        }
        if name.chars().count() > SHOW_NAME_MAX {
            return Err(ModelError::invalid_field(
                "name",
                format!("must be at most {SHOW_NAME_MAX} characters"),
            ));
        }
        let year = self.year.trim();
        if year.is_empty() || year.chars().count() > SHOW_YEAR_MAX {
            return Err(ModelError::invalid_field(
                "year",
                format!("must be 1-{SHOW_YEAR_MAX} characters"),
            ));
        }
        if !self.kind.is_episodic() && !self.episodes.is_empty() {
            return Err(ModelError::InvalidEpisodeCounts(
                "films cannot carry episode counts".into(),
            ));
        }
        self.episodes.validate()
    }
}

/// Compact projection used by listings and home-page feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowCard {
    pub id: ShowID,
    pub name: String,
    pub sample: bool,
    pub captions: bool,
    pub image: Option<String>,
    pub in_favorites: bool,
    pub in_watchlist: bool,
}

impl ShowCard {
    pub fn new(show: &Show, in_favorites: bool, in_watchlist: bool) -> Self {
        Self {
            id: show.id,
            name: show.name.clone(),
            sample: show.sample,
            captions: show.captions,
            image: show.image.clone(),
            in_favorites,
            in_watchlist,
        }
    }
}

/// The two user-curated show lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserList {
    Favorites,
    Watchlist,
}

impl UserList {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserList::Favorites => "favorites",
            UserList::Watchlist => "watchlist",
        }
    }
}

impl fmt::Display for UserList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_counts_round_trip_with_string_keys() {
        let counts = EpisodeCounts::from_seasons(&[10, 8]);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"1":10,"2":8}"#);
        let back: EpisodeCounts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, counts);
    }

    #[test]
    fn episode_counts_reject_gaps_and_empty_seasons() {
        let gap: EpisodeCounts = serde_json::from_str(r#"{"1":3,"3":4}"#).unwrap();
        assert!(gap.validate().is_err());

        let empty_season = EpisodeCounts::from_seasons(&[3, 0]);
        assert!(empty_season.validate().is_err());

        assert!(EpisodeCounts::new().validate().is_ok());
    }

    #[test]
    fn contains_checks_bounds() {
        let counts = EpisodeCounts::from_seasons(&[3, 2]);
        assert!(counts.contains(SeasonEpisode::new(2, 2)));
        assert!(!counts.contains(SeasonEpisode::new(2, 3)));
        assert!(!counts.contains(SeasonEpisode::new(0, 1)));
        assert!(!counts.contains(SeasonEpisode::new(1, 0)));
        assert_eq!(counts.last(), Some(SeasonEpisode::new(2, 2)));
    }

    #[test]
    fn films_cannot_have_episodes() {
        let mut draft = ShowDraft::named("Heat");
        draft.episodes = EpisodeCounts::from_seasons(&[1]);
        assert!(draft.validate().is_err());

        draft.kind = ShowKind::Series;
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn age_uses_leading_year() {
        let mut show = Show::from_draft(
            ShowID(1),
            ShowDraft::named("Dark"),
            Utc::now(),
        );
        show.year = format!("{}-2099", crate::current_year() - 5);
        assert_eq!(show.age(), Some(5));
        show.year = "unknown".into();
        assert_eq!(show.age(), None);
    }
}

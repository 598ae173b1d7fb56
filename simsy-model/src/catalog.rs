//! Catalog entities other than shows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::{ArtistID, CountryID, TaxonomyID};

pub const TAXONOMY_NAME_MAX: usize = 50;
pub const ARTIST_NAME_MAX: usize = 100;
pub const COUNTRY_NAME_MAX: usize = 100;

fn validate_name(name: &str, max: usize) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ModelError::invalid_field("name", "must not be empty"));
    }
    if name.chars().count() > max {
        return Err(ModelError::invalid_field(
            "name",
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// The four catalog entities that share the `{id, name, image, description}`
/// shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    Language,
    Genre,
    Rating,
    Label,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 4] = [
        TaxonomyKind::Language,
        TaxonomyKind::Genre,
        TaxonomyKind::Rating,
        TaxonomyKind::Label,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyKind::Language => "language",
            TaxonomyKind::Genre => "genre",
            TaxonomyKind::Rating => "rating",
            TaxonomyKind::Label => "label",
        }
    }

    /// Plural form used for tables, URL segments and media folders.
    pub fn collection(&self) -> &'static str {
        match self {
            TaxonomyKind::Language => "languages",
            TaxonomyKind::Genre => "genres",
            TaxonomyKind::Rating => "ratings",
            TaxonomyKind::Label => "labels",
        }
    }

    /// Languages and genres list alphabetically; ratings and labels keep
    /// insertion order.
    pub fn orders_by_name(&self) -> bool {
        matches!(self, TaxonomyKind::Language | TaxonomyKind::Genre)
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxonomyKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        TaxonomyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.collection() == s)
            .ok_or_else(|| ModelError::invalid_field("kind", format!("unknown taxonomy {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub id: TaxonomyID,
    pub kind: TaxonomyKind,
    pub name: String,
    pub image: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl TaxonomyDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name, TAXONOMY_NAME_MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryID,
    pub name: String,
    pub language_ids: Vec<TaxonomyID>,
    pub flag: Option<String>,
    pub image: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDraft {
    pub name: String,
    #[serde(default)]
    pub language_ids: Vec<TaxonomyID>,
    #[serde(default)]
    pub description: String,
}

impl CountryDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language_ids: Vec::new(),
            description: String::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name, COUNTRY_NAME_MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistID,
    pub name: String,
    pub birth_year: i32,
    pub nationality: Option<CountryID>,
    pub image: Option<String>,
    pub description: String,
}

impl Artist {
    pub fn age(&self) -> i32 {
        crate::current_year() - self.birth_year
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistDraft {
    pub name: String,
    #[serde(default = "crate::current_year")]
    pub birth_year: i32,
    #[serde(default)]
    pub nationality: Option<CountryID>,
    #[serde(default)]
    pub description: String,
}

impl ArtistDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_year: crate::current_year(),
            nationality: None,
            description: String::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name, ARTIST_NAME_MAX)?;
        if self.birth_year < 1000 || self.birth_year > crate::current_year() {
            return Err(ModelError::invalid_field(
                "birth_year",
                "must be a four digit year not in the future",
            ));
        }
        Ok(())
    }
}

/// An image-bearing field on a catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Show,
    Artist,
    CountryFlag,
    CountryImage,
    Taxonomy(TaxonomyKind),
}

impl ImageSlot {
    /// Top-level media folder for the owning entity.
    pub fn collection(&self) -> &'static str {
        match self {
            ImageSlot::Show => "shows",
            ImageSlot::Artist => "artists",
            ImageSlot::CountryFlag | ImageSlot::CountryImage => "countries",
            ImageSlot::Taxonomy(kind) => kind.collection(),
        }
    }

    pub fn slot(&self) -> &'static str {
        match self {
            ImageSlot::CountryFlag => "flag",
            _ => "image",
        }
    }

    /// Parse the `{collection}/{slot}` pair used by the upload route.
    pub fn parse(collection: &str, slot: &str) -> Option<Self> {
        let parsed = match (collection, slot) {
            ("shows", "image") => ImageSlot::Show,
            ("artists", "image") => ImageSlot::Artist,
            ("countries", "flag") => ImageSlot::CountryFlag,
            ("countries", "image") => ImageSlot::CountryImage,
            (other, "image") => {
                ImageSlot::Taxonomy(other.parse::<TaxonomyKind>().ok()?)
            }
            _ => return None,
        };
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_kind_parses_singular_and_plural() {
        assert_eq!("genre".parse::<TaxonomyKind>().unwrap(), TaxonomyKind::Genre);
        assert_eq!("labels".parse::<TaxonomyKind>().unwrap(), TaxonomyKind::Label);
        assert!("studio".parse::<TaxonomyKind>().is_err());
    }

    #[test]
    fn name_limits_are_enforced() {
        assert!(TaxonomyDraft::named("x".repeat(50)).validate().is_ok());
        assert!(TaxonomyDraft::named("x".repeat(51)).validate().is_err());
        assert!(CountryDraft::named("   ").validate().is_err());
        assert!(ArtistDraft::named("x".repeat(101)).validate().is_err());
    }

    #[test]
    fn image_slot_round_trips_through_route_segments() {
        for slot in [
            ImageSlot::Show,
            ImageSlot::Artist,
            ImageSlot::CountryFlag,
            ImageSlot::CountryImage,
            ImageSlot::Taxonomy(TaxonomyKind::Rating),
        ] {
            assert_eq!(ImageSlot::parse(slot.collection(), slot.slot()), Some(slot));
        }
        assert_eq!(ImageSlot::parse("shows", "flag"), None);
    }
}

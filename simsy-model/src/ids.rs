//! Strongly typed catalog identifiers.
//!
//! Catalog rows use database-assigned integer keys so ids stay short in URLs.
//! Each wrapper is transparent on the wire.

use serde::{Deserialize, Serialize};

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

catalog_id!(
    /// Identifier of a film, series or program.
    ShowID
);
catalog_id!(
    /// Identifier of an artist.
    ArtistID
);
catalog_id!(
    /// Identifier of a country.
    CountryID
);
catalog_id!(
    /// Identifier of a language, genre, rating or label. Only unique within
    /// its [`crate::TaxonomyKind`].
    TaxonomyID
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&ShowID::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: ShowID = serde_json::from_str("7").unwrap();
        assert_eq!(back, ShowID(7));
    }
}

use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A field failed validation. Carries the field name and the reason.
    InvalidField { field: &'static str, reason: String },
    /// Episode counts are not contiguous from season 1 or contain empty seasons.
    InvalidEpisodeCounts(String),
    UnknownShowKind(String),
}

impl ModelError {
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        ModelError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidField { field, reason } => {
                write!(f, "invalid {field}: {reason}")
            }
            ModelError::InvalidEpisodeCounts(msg) => {
                write!(f, "invalid episode counts: {msg}")
            }
            ModelError::UnknownShowKind(kind) => {
                write!(f, "unknown show kind: {kind}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;

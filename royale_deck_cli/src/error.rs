//! Error types for the deck browser and builder.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("no card matches '{0}'")]
    UnknownCard(String),

    #[error("'{query}' matches several cards: {candidates}")]
    AmbiguousCard { query: String, candidates: String },

    #[error("deck is full ({0} cards)")]
    DeckFull(usize),

    #[error("{0} is already in the deck")]
    DuplicateCard(String),

    #[error("slot {0} is empty")]
    EmptySlot(usize),

    #[error("invalid {kind}: '{value}'")]
    Parse { kind: &'static str, value: String },

    #[error("card {0} has no type and its id is outside the troop/building/spell ranges")]
    UnknownCategory(u32),

    #[error("card id {0} appears more than once in the catalog")]
    DuplicateId(u32),

    #[error("deck '{id}' is invalid: {reason}")]
    InvalidDeck { id: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("clipboard write failed: {0}")]
    Clipboard(#[source] io::Error),

    #[error(transparent)]
    Output(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn parse(kind: &'static str, value: &str) -> Self {
        Error::Parse {
            kind,
            value: value.to_string(),
        }
    }
}

//! Error types for record loading, sort parsing and html output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("record #{index} is invalid: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("record #{index} has a non-finite imdb rating")]
    NonFiniteRating { index: usize },

    #[error("record data must be a JSON array of objects: {0}")]
    MalformedDocument(#[source] serde_json::Error),

    #[error("unknown field `{0}` (expected one of: id, title, year, imdb)")]
    UnknownField(String),

    #[error("invalid sort direction `{0}` (expected `asc` or `desc`)")]
    UnknownDirection(String),

    #[error("failed to render html: {0}")]
    Render(#[from] askama::Error),
}

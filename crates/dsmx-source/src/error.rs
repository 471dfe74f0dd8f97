//! Error types for the word dump backend.
//!
//! Uses [`thiserror`] for error derivation. [`DumpError`] converts into
//! [`SourceError`] so callers of the [`WordSource`](dsmx_core::WordSource)
//! trait see one error type.

use dsmx_core::SourceError;
use thiserror::Error;

/// Error loading or validating a word dump.
#[derive(Debug, Error)]
pub enum DumpError {
    /// Error reading the dump.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dump is not valid JSON of the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The dump parsed but its content is unusable.
    #[error("invalid word dump: {0}")]
    Invalid(String),
}

impl From<DumpError> for SourceError {
    fn from(err: DumpError) -> Self {
        SourceError::Unavailable(err.to_string())
    }
}

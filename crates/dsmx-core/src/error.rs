//! Error types for dsmx.
//!
//! [`SourceError`] is what a [`WordSource`](crate::WordSource) reports for a
//! single page; [`ExtractError`] is the fatal error surfaced by extraction.
//! Soft conditions (a failing table finder, a page without text) never reach
//! these types: they are absorbed where they occur.

use std::fmt;

/// Error reported by a word source for a page request.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The requested 0-based page index does not exist.
    PageOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of pages in the source.
        count: usize,
    },
    /// The source could not produce data for the page.
    Unavailable(String),
    /// The table finder failed on the page.
    TableFinder {
        /// 0-based page index.
        page: usize,
        /// Backend message.
        reason: String,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::PageOutOfRange { index, count } => {
                write!(f, "page index {index} out of range (document has {count} pages)")
            }
            SourceError::Unavailable(msg) => write!(f, "source unavailable: {msg}"),
            SourceError::TableFinder { page, reason } => {
                write!(f, "table finder failed on page index {page}: {reason}")
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Fatal extraction error.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// Tokens or page geometry could not be obtained for a page.
    SourceUnavailable {
        /// 1-based page number.
        page: usize,
        /// Underlying source error.
        source: SourceError,
    },
    /// A requested page range does not fit the document.
    InvalidPageRange {
        /// First requested page (1-based).
        start: usize,
        /// Last requested page (1-based, inclusive).
        end: usize,
        /// Pages in the document.
        page_count: usize,
    },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::SourceUnavailable { page, source } => {
                write!(f, "page {page}: {source}")
            }
            ExtractError::InvalidPageRange {
                start,
                end,
                page_count,
            } => write!(
                f,
                "invalid page range {start}-{end} (document has {page_count} pages)"
            ),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::SourceUnavailable { source, .. } => Some(source),
            ExtractError::InvalidPageRange { .. } => None,
        }
    }
}

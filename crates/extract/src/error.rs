//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The page is not the kind of page that was requested.
    #[display("unexpected page: missing {_0}")]
    InvalidDocument(#[error(not(source))] &'static str),
    /// A required field could not be found in the document.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The offending text.
        value: String,
    },
    /// Study area rows do not nest consistently.
    #[display("malformed study area tree at row {_0}")]
    MalformedTree(#[error(not(source))] usize),
    /// A study area that has children was never expanded, so its subtree is missing from the page.
    #[display("study area at row {_0} is collapsed")]
    CollapsedArea(#[error(not(source))] usize),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A page either parses or it doesn't; a retry only helps if the
        // portal served something different, which is the caller's call.
        false
    }
}

//! Model Error Types
//!
//! Construction errors raised while building keys and trees. These indicate a
//! bug in whatever produced the input (usually page extraction), so callers
//! are expected to treat them as fatal.

use derive_more::{Display, Error};

/// A model construction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for model construction.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A key component was absent (zero or empty).
    #[display("missing module key component: {_0}")]
    MissingKeyComponent(#[error(not(source))] &'static str),
    /// A key component was present but not a number.
    #[display("invalid module key component '{field}': {value}")]
    InvalidKey { field: &'static str, value: String },
    /// Study area parent links do not form a forest.
    #[display("invalid study area tree: {_0}")]
    InvalidTree(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

//! Store Error Types
//!
//! Everything except [`ErrorKind::DuplicateKey`] and
//! [`ErrorKind::ModuleNotFound`] means the database itself is unusable, and a
//! harvest must stop rather than continue with a store it cannot trust.

use derive_more::{Display, Error};

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A record with the same natural key already exists.
    #[display("duplicate key: {_0}")]
    DuplicateKey(#[error(not(source))] String),
    /// The module is not stored in listing state (unknown, or already detailed).
    #[display("module not found in listing state: {_0}")]
    ModuleNotFound(#[error(not(source))] String),
    /// A stored value does not fit the domain type it is read into (or vice versa).
    #[display("invalid store data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

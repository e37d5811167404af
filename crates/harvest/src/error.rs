//! Harvest Error Types
//!
//! Every error that reaches a caller is fatal for the run: per-module fetch
//! failures are reported as events instead and never surface here.

use derive_more::{Display, Error};
use mts_models::DegreeProgram;
use mts_store::error::{Error as StoreError, ErrorKind as StoreErrorKind};

/// A harvest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for harvest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// ### Dependency Errors
/// - [`ErrorKind::Fetch`]: the program catalog or study area tree could not be retrieved.
/// - [`ErrorKind::Persistence`]: the store failed; nothing after the failure was written.
/// - [`ErrorKind::DuplicateKey`]: the store already held something the planner believed absent.
/// - [`ErrorKind::Construction`]: stored or fetched data does not form valid entities.
///
/// ### Operational Errors
/// - [`ErrorKind::ProgramNotFound`]
/// - [`ErrorKind::AmbiguousTarget`]
/// - [`ErrorKind::Aborted`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("portal request failed")]
    Fetch,
    #[display("store operation failed")]
    Persistence,
    #[display("duplicate key: {_0}")]
    DuplicateKey(#[error(not(source))] String),
    #[display("invalid catalog data")]
    Construction,
    #[display("no degree program matches '{_0}'")]
    ProgramNotFound(#[error(not(source))] String),
    #[display("'{target}' matches {} degree programs", candidates.len())]
    AmbiguousTarget { target: String, candidates: Vec<DegreeProgram> },
    #[display("harvest ended without completing")]
    Aborted,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch)
    }

    /// Convert a store error into a harvest error, preserving the store's
    /// `Exn` frame as a child in the error tree.
    #[track_caller]
    pub(crate) fn store(err: StoreError) -> Error {
        let kind = match &*err {
            StoreErrorKind::DuplicateKey(key) => Self::DuplicateKey(key.clone()),
            StoreErrorKind::InvalidData(_) => Self::Construction,
            _ => Self::Persistence,
        };
        err.raise(kind)
    }
}

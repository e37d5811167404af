//! Portal Error Types
//!
//! Every variant is a fetch failure from the harvester's point of view: the
//! page could not be retrieved, or it could not be understood.

use derive_more::{Display, Error};

/// A portal error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for portal operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The driver could not render the page.
    #[display("failed to fetch {_0}")]
    Fetch(#[error(not(source))] String),
    /// The driver did not finish rendering in time.
    #[display("timed out fetching {_0}")]
    Timeout(#[error(not(source))] String),
    /// The page was rendered but its markup was not what was expected.
    #[display("unexpected markup on {_0}")]
    UnexpectedMarkup(#[error(not(source))] String),
    /// No usable Chrome/Chromium installation was found.
    #[display("chrome executable not found")]
    ChromeNotFound,
    /// The driver cannot perform an interaction the page needs.
    #[display("{action} is not supported by this driver (needed for {url})")]
    Unsupported {
        /// What the page needed.
        action: &'static str,
        /// The page that needed it.
        url: String,
    },
    /// The browser profile for the session could not be set up.
    #[display("browser session setup failed")]
    Session,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Timeout(_))
    }
}

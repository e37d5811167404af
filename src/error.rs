//! Binary Error Types
//!
//! Each variant names the layer a command failed in; the library error tree
//! underneath carries the detail.

use derive_more::{Display, Error};

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open the database")]
    Store,
    #[display("could not open a portal session")]
    Portal,
    #[display("harvest failed")]
    Harvest,
    #[display("degree program {_0} has not been harvested")]
    NotHarvested(#[error(not(source))] u64),
}

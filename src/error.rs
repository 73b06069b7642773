//! Domain-specific errors for the velocity store.
//!
//! Unseen cards are not errors (they simply have no prior usage) and lock
//! acquisition cannot fail, so the only business failure is a malformed
//! query window. I/O and CSV parsing errors are handled by the runners.

use chrono::TimeDelta;
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum Error {
    #[error("usage window must not be negative, got {0}")]
    NegativeWindow(TimeDelta),
}

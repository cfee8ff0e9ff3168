//! ERV-selection error type.

use thiserror::Error;

/// Errors produced by `erv-select`.
#[derive(Debug, Error)]
pub enum SelectError {
    /// The candidate set was empty.
    #[error("no available ERV to select from")]
    NoAvailableErv,

    #[error("invalid GA configuration: {0}")]
    Config(String),
}

pub type SelectResult<T> = Result<T, SelectError>;

//! Reroute-planner error type.

use thiserror::Error;

use erv_network::NetworkError;

/// Errors produced by `erv-reroute`.
///
/// Failing to find a detour is not an error; see
/// [`RerouteOutcome::NoAlternateRoute`](crate::RerouteOutcome::NoAlternateRoute).
#[derive(Debug, Error)]
pub enum RerouteError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("invalid ACO configuration: {0}")]
    Config(String),
}

pub type RerouteResult<T> = Result<T, RerouteError>;

//! Congestion-scoring error type.

use thiserror::Error;

use erv_core::SegmentId;
use erv_network::NetworkError;

/// Errors produced by `erv-congestion`.
#[derive(Debug, Error)]
pub enum CongestionError {
    /// The segment exists but nothing has been sampled on it yet.
    #[error("no traffic sample recorded for {0}")]
    NoData(SegmentId),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("invalid fuzzy configuration: {0}")]
    Config(String),
}

pub type CongestionResult<T> = Result<T, CongestionError>;

//! Network-model error type.

use thiserror::Error;

use erv_core::SegmentId;

/// Errors produced by `erv-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("segment {0} not found in network")]
    UnknownSegment(SegmentId),

    #[error("no route from {from} to {to}")]
    NoRoute { from: SegmentId, to: SegmentId },

    #[error("invalid sample for {segment}: {reason}")]
    InvalidSample { segment: SegmentId, reason: String },
}

pub type NetworkResult<T> = Result<T, NetworkError>;

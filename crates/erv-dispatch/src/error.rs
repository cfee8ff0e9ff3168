//! Orchestrator error type.

use thiserror::Error;

use erv_congestion::CongestionError;
use erv_core::{AccidentId, CoreError};
use erv_network::NetworkError;
use erv_reroute::RerouteError;
use erv_select::SelectError;

use crate::accident::AccidentPhase;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("engine configuration error: {0}")]
    Config(String),

    #[error("accident {0} is not registered")]
    UnknownAccident(AccidentId),

    #[error("accident {0} is already registered")]
    DuplicateAccident(AccidentId),

    #[error("accident {accident}: cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        accident: AccidentId,
        from:     AccidentPhase,
        to:       AccidentPhase,
    },

    #[error("invalid vehicle report: {0}")]
    Core(#[from] CoreError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("congestion error: {0}")]
    Congestion(#[from] CongestionError),

    #[error("selection error: {0}")]
    Select(#[from] SelectError),

    #[error("reroute error: {0}")]
    Reroute(#[from] RerouteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

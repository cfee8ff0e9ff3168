//! Shared error type.
//!
//! Component crates define their own error enums; the orchestrator converts
//! them into its own error via `From` impls.

use thiserror::Error;

use crate::VehicleId;

/// The base error type for `erv-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A state report no vehicle can be in.
    #[error("vehicle {vehicle}: {reason}")]
    InvalidVehicle { vehicle: VehicleId, reason: String },
}

/// Shorthand result type for `erv-core`.
pub type CoreResult<T> = Result<T, CoreError>;

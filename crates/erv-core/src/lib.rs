//! `erv-core` — foundational types for the ERV dispatch engine.
//!
//! This crate is a dependency of every other `erv-*` crate.  It has no
//! `erv-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `SegmentId`, `VehicleId`, `AccidentId`, `RsuId`         |
//! | [`geo`]       | `Point2` (planar metres)                                |
//! | [`time`]      | `Tick`, `SimClock`                                      |
//! | [`rng`]       | `SimRng` (seeded, stream-splittable)                    |
//! | [`vehicle`]   | `VehicleState`, `VehicleKind`                           |
//! | [`error`]     | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;
pub mod vehicle;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::Point2;
pub use ids::{AccidentId, RsuId, SegmentId, VehicleId};
pub use rng::SimRng;
pub use time::{SimClock, Tick};
pub use vehicle::{VehicleKind, VehicleState};

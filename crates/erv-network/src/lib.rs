//! `erv-network` — the road network model.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-trees + samples), `RoadNetworkBuilder` |
//! | [`sample`]  | `Sample`, `SampleWindow` (bounded rolling history)            |
//! | [`router`]  | `Router` trait, `Route`, `DijkstraRouter`                     |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                            |
//!
//! # Concurrency
//!
//! `RoadNetwork` is `Sync`.  Topology is immutable after `build()`; traffic
//! samples sit behind one `parking_lot::RwLock` per segment, so the state
//! feed can append samples through `&RoadNetwork` while accident pipelines
//! read from other threads.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod network;
pub mod router;
pub mod sample;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use network::{RoadNetwork, RoadNetworkBuilder, RoadSegment};
pub use router::{DijkstraRouter, Route, Router};
pub use sample::{Sample, SampleWindow};

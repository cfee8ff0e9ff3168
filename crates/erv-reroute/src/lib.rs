//! `erv-reroute` — ant-colony detour planning.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`pheromone`] | `PheromoneMatrix`, `TrailUpdate`, `SharedPheromones`       |
//! | [`config`]    | `AcoConfig`                                                |
//! | [`ant`]       | Probabilistic path construction for a single ant           |
//! | [`planner`]   | `ReroutePlanner`, `RerouteRequest`, `RerouteOutcome`       |
//! | [`error`]     | `RerouteError`, `RerouteResult<T>`                         |
//!
//! # Pheromone discipline
//!
//! The matrix is the only state that outlives a planner call.  A call works
//! on a private copy: ants read it without locking, and each round's
//! evaporation and deposits are applied to the copy and recorded in a
//! [`TrailUpdate`].  The caller commits the whole update to the shared matrix
//! under one write lock, so concurrent calls never observe each other's
//! partial rounds.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Ants within a round are built on Rayon's thread pool.    |

pub mod ant;
pub mod config;
pub mod error;
pub mod pheromone;
pub mod planner;


pub use config::AcoConfig;
pub use error::{RerouteError, RerouteResult};
pub use pheromone::{shared, Edge, PheromoneMatrix, SharedPheromones, TrailUpdate};
pub use planner::{ReroutePlanner, RerouteOutcome, RerouteRequest};

//! `erv-select` — choosing the responding ERV with a genetic algorithm.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`profile`] | `ErvProfile`, `FitnessWeights`, normalisation and fitness |
//! | [`config`]  | `GaConfig`                                                |
//! | [`ga`]      | `ErvSelector`, `Selection`                                |
//! | [`error`]   | `SelectError`, `SelectResult<T>`                          |
//!
//! # Encoding
//!
//! An individual is a single gene: the index of one candidate in the
//! id-sorted candidate list.  Crossover therefore picks one parent's gene and
//! mutation swaps in a different candidate.  The best individual of each
//! generation is carried over unchanged, so the best fitness never falls from
//! one generation to the next.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Fitness evaluation uses Rayon.  Output is unchanged.     |

pub mod config;
pub mod error;
pub mod ga;
pub mod profile;


pub use config::GaConfig;
pub use error::{SelectError, SelectResult};
pub use ga::{ErvSelector, Selection};
pub use profile::{ErvProfile, FitnessWeights, Normalized};

//! `erv-congestion` — fuzzy congestion scoring.
//!
//! A segment's latest traffic sample is turned into two crisp inputs,
//! *density* (`vehicle_count / capacity`) and *speed ratio*
//! (`avg_speed / free_flow_speed`).  Both are fuzzified over Low/Medium/High,
//! a 3×3 rule table maps each combination to an output congestion level, and
//! the aggregated output is defuzzified by centroid to a score in `[0, 10]`.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`membership`] | `MembershipFn` (triangle / trapezoid), exact area/centroid |
//! | [`variable`]   | `LinguisticVariable`, `OutputSets`                         |
//! | [`rules`]      | `CongestionLevel`, `RuleBase`                              |
//! | [`scorer`]     | `FuzzyConfig`, `ScoreInput`, `CongestionScorer`            |
//! | [`board`]      | `CongestionScore`, `ScoreBoard` (freshness-aware cache)    |
//! | [`error`]      | `CongestionError`, `CongestionResult<T>`                   |
//!
//! # Inference
//!
//! Rules fire with the product of the two input memberships.  Each output set
//! is scaled by its firing strength and the scaled sets are summed, so the
//! centroid of the aggregate is exactly `Σ wᵢ·areaᵢ·centroidᵢ / Σ wᵢ·areaᵢ`.
//! No sampling grid is involved and identical inputs always give identical
//! scores.

pub mod board;
pub mod error;
pub mod membership;
pub mod rules;
pub mod scorer;
pub mod variable;

#[cfg(test)]
mod tests;

pub use board::{CongestionScore, ScoreBoard};
pub use error::{CongestionError, CongestionResult};
pub use membership::MembershipFn;
pub use rules::{CongestionLevel, RuleBase};
pub use scorer::{CongestionScorer, FuzzyConfig, ScoreInput, MAX_SCORE};
pub use variable::{LinguisticVariable, OutputSets};

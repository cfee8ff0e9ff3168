//! Path construction for a single ant.
//!
//! From its current segment an ant picks the next segment among the
//! non-forbidden, not-yet-visited successors with probability proportional to
//!
//! ```text
//! τ(current → next)^α · η(next)^β,    η(s) = 1 / (length(s) · (1 + congestion(s)))
//! ```
//!
//! The walk ends at the goal or at a dead end.  Because visited segments are
//! never re-entered, a walk takes at most `segment_count` steps.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use erv_core::{SegmentId, SimRng};
use erv_network::RoadNetwork;

use crate::pheromone::PheromoneMatrix;

/// A completed walk from start to goal.
#[derive(Clone, Debug, PartialEq)]
pub struct AntPath {
    pub segments: Vec<SegmentId>,
    /// Sum of `length · (1 + congestion)` over the segments entered after
    /// the start.
    pub cost: f32,
}

impl AntPath {
    /// Consecutive `(from, to)` pairs of the walk.
    pub fn edges(&self) -> impl Iterator<Item = (SegmentId, SegmentId)> + '_ {
        self.segments.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Everything an ant reads while walking.  Shared by all ants of a round.
pub struct Terrain<'a> {
    pub network:   &'a RoadNetwork,
    pub trails:    &'a PheromoneMatrix,
    pub forbidden: &'a BTreeSet<SegmentId>,
    /// Cost of entering a segment, `length · (1 + congestion)`.
    pub cost:      &'a (dyn Fn(SegmentId) -> f32 + Sync),
    pub alpha:     f32,
    pub beta:      f32,
}

/// Walk from `start` towards `goal`.  `None` on a dead end.
///
/// Both segments must belong to the network.
pub fn construct(terrain: &Terrain<'_>, start: SegmentId, goal: SegmentId, rng: &mut SimRng) -> Option<AntPath> {
    let mut visited: FxHashSet<SegmentId> = FxHashSet::default();
    visited.insert(start);

    let mut segments = vec![start];
    let mut cost     = 0.0f32;
    let mut current  = start;
    let mut options: Vec<(SegmentId, f64)> = Vec::new();

    while current != goal {
        options.clear();
        for &next in terrain.network.successors(current) {
            if terrain.forbidden.contains(&next) || visited.contains(&next) {
                continue;
            }
            let tau = terrain.trails.get(current, next) as f64;
            let eta = 1.0 / (terrain.cost)(next).max(f32::EPSILON) as f64;
            options.push((next, tau.powf(terrain.alpha as f64) * eta.powf(terrain.beta as f64)));
        }

        let next = pick(&options, rng)?;
        cost += (terrain.cost)(next);
        visited.insert(next);
        segments.push(next);
        current = next;
    }

    Some(AntPath { segments, cost })
}

/// Roulette-wheel choice.  Falls back to a uniform pick when the weights do
/// not form a usable distribution.
fn pick(options: &[(SegmentId, f64)], rng: &mut SimRng) -> Option<SegmentId> {
    if options.is_empty() {
        return None;
    }
    let total: f64 = options.iter().map(|&(_, w)| w).sum();
    if !(total.is_finite() && total > 0.0) {
        return Some(options[rng.gen_range(0..options.len())].0);
    }

    let mut r = rng.gen_range(0.0..total);
    for &(seg, w) in options {
        if r < w {
            return Some(seg);
        }
        r -= w;
    }
    options.last().map(|&(seg, _)| seg)
}

//! The pheromone matrix.
//!
//! Trails are stored sparsely: only edges that have received a deposit get a
//! map entry.  Every other edge reads the *background* level, which starts at
//! the initial trail and evaporates along with the stored entries, so the
//! whole matrix decays uniformly without touching every edge.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use erv_core::SegmentId;

/// Directed `(from, to)` segment transition.
pub type Edge = (SegmentId, SegmentId);

/// Matrix shared by every planner call in a run.
pub type SharedPheromones = Arc<RwLock<PheromoneMatrix>>;

/// Wrap a matrix for sharing.
pub fn shared(matrix: PheromoneMatrix) -> SharedPheromones {
    Arc::new(RwLock::new(matrix))
}

// ── PheromoneMatrix ───────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct PheromoneMatrix {
    trails:     FxHashMap<Edge, f32>,
    background: f32,
    floor:      f32,
}

impl PheromoneMatrix {
    /// New matrix where every edge starts at `initial`.  No trail ever drops
    /// below `floor`.
    pub fn new(initial: f32, floor: f32) -> Self {
        let floor = floor.max(0.0);
        Self { trails: FxHashMap::default(), background: initial.max(floor), floor }
    }

    /// Trail strength on `from → to`.
    #[inline]
    pub fn get(&self, from: SegmentId, to: SegmentId) -> f32 {
        self.trails.get(&(from, to)).copied().unwrap_or(self.background)
    }

    /// Multiply every trail by `1 − rate`, clamped at the floor.
    pub fn evaporate(&mut self, rate: f32) {
        let keep  = (1.0 - rate).clamp(0.0, 1.0);
        let floor = self.floor;
        self.background = (self.background * keep).max(floor);
        for v in self.trails.values_mut() {
            *v = (*v * keep).max(floor);
        }
    }

    /// Add `amount` (ignored unless positive) to `edge`.
    pub fn deposit(&mut self, edge: Edge, amount: f32) {
        if !(amount.is_finite() && amount > 0.0) {
            return;
        }
        let background = self.background;
        *self.trails.entry(edge).or_insert(background) += amount;
    }

    /// Replay a recorded update.
    pub fn apply(&mut self, update: &TrailUpdate) {
        for round in &update.rounds {
            self.evaporate(update.evaporation_rate);
            for &(edge, amount) in round {
                self.deposit(edge, amount);
            }
        }
    }

    /// Smallest trail anywhere in the matrix.
    pub fn min_trail(&self) -> f32 {
        self.trails.values().copied().fold(self.background, f32::min)
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    pub fn background(&self) -> f32 {
        self.background
    }

    /// Number of edges carrying their own trail.
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }
}

// ── TrailUpdate ───────────────────────────────────────────────────────────────

/// Evaporation and deposits produced by one planner call, one entry per
/// round, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrailUpdate {
    pub evaporation_rate: f32,
    pub rounds:           Vec<Vec<(Edge, f32)>>,
}

impl TrailUpdate {
    pub fn new(evaporation_rate: f32) -> Self {
        Self { evaporation_rate, rounds: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

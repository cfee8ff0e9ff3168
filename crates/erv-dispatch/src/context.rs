//! The simulation context passed by reference into every core operation.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use erv_congestion::{CongestionScorer, ScoreBoard};
use erv_core::{VehicleId, VehicleState};
use erv_network::RoadNetwork;

// ── VehicleStore ──────────────────────────────────────────────────────────────

/// Latest reported state of every vehicle, keyed (and iterated) by id.
///
/// The state feed replaces records wholesale; the engine only reads copies.
#[derive(Default)]
pub struct VehicleStore {
    inner: RwLock<BTreeMap<VehicleId, VehicleState>>,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a vehicle's state.  Returns the previous one.
    pub fn upsert(&self, state: VehicleState) -> Option<VehicleState> {
        self.inner.write().insert(state.id, state)
    }

    pub fn remove(&self, id: VehicleId) -> Option<VehicleState> {
        self.inner.write().remove(&id)
    }

    pub fn get(&self, id: VehicleId) -> Option<VehicleState> {
        self.inner.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// ERVs with their availability flag set, ascending id.
    pub fn available_ervs(&self) -> Vec<VehicleState> {
        self.filtered(VehicleState::is_available_erv)
    }

    /// Civilian vehicles, ascending id.
    pub fn civilians(&self) -> Vec<VehicleState> {
        self.filtered(VehicleState::is_civilian)
    }

    fn filtered(&self, keep: impl Fn(&VehicleState) -> bool) -> Vec<VehicleState> {
        self.inner.read().values().filter(|v| keep(v)).cloned().collect()
    }
}

// ── SimContext ────────────────────────────────────────────────────────────────

/// Everything shared by the accident pipelines of one run.
///
/// Every field is safe to use through `&SimContext` from several threads:
/// samples, vehicles and cached scores each sit behind their own lock.
pub struct SimContext {
    pub network:  RoadNetwork,
    pub vehicles: VehicleStore,
    pub scores:   ScoreBoard,
}

impl SimContext {
    pub fn new(network: RoadNetwork, scorer: CongestionScorer, freshness_ticks: u64) -> Self {
        Self {
            network,
            vehicles: VehicleStore::new(),
            scores:   ScoreBoard::new(scorer, freshness_ticks),
        }
    }
}

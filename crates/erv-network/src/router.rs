//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The orchestrator calls routing via the [`Router`] trait so alternative
//! search strategies can be swapped in without touching the pipeline.
//!
//! # Cost model
//!
//! Entering a segment costs `weight(segment)`, supplied by the caller.  The
//! orchestrator passes `length_m × (1 + congestion)` so the ERV path honours
//! current congestion.  Costs are accumulated as integer milli-units so heap
//! ordering is total and tie-breaking is deterministic.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use erv_core::SegmentId;

use crate::network::RoadNetwork;
use crate::{NetworkError, NetworkResult};

/// Integer milli-units per unit of weight.
const COST_SCALE: f32 = 1_000.0;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Segments in travel order.  The first entry is the start segment, the
    /// last is the destination.
    pub segments: Vec<SegmentId>,
    /// Total length of the segments entered after the start, in metres.
    pub length_m: f32,
    /// Total weighted cost of the segments entered after the start.
    pub cost: f32,
}

impl Route {
    /// `true` if the start is the destination.
    pub fn is_trivial(&self) -> bool {
        self.segments.len() <= 1
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.segments.contains(&id)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync` so a single router can be shared by
/// accident pipelines running on different threads.
pub trait Router: Send + Sync {
    /// Cheapest route from `from` to `to` that never enters a segment in
    /// `avoid`.  The start segment itself may be in `avoid`.
    ///
    /// `from == to` yields a one-segment route with zero cost.
    fn route(
        &self,
        network: &RoadNetwork,
        from:    SegmentId,
        to:      SegmentId,
        weight:  &dyn Fn(SegmentId) -> f32,
        avoid:   &BTreeSet<SegmentId>,
    ) -> NetworkResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR segment graph.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        network: &RoadNetwork,
        from:    SegmentId,
        to:      SegmentId,
        weight:  &dyn Fn(SegmentId) -> f32,
        avoid:   &BTreeSet<SegmentId>,
    ) -> NetworkResult<Route> {
        dijkstra(network, from, to, weight, avoid)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[inline]
fn scaled(w: f32) -> u64 {
    if w.is_finite() && w > 0.0 { (w * COST_SCALE).round() as u64 } else { 0 }
}

fn dijkstra(
    network: &RoadNetwork,
    from:    SegmentId,
    to:      SegmentId,
    weight:  &dyn Fn(SegmentId) -> f32,
    avoid:   &BTreeSet<SegmentId>,
) -> NetworkResult<Route> {
    network.segment(from)?;
    network.segment(to)?;

    if from == to {
        return Ok(Route { segments: vec![from], length_m: 0.0, cost: 0.0 });
    }
    if avoid.contains(&to) {
        return Err(NetworkError::NoRoute { from, to });
    }

    let n = network.segment_count();
    // dist[v] = best known cost to have entered v.
    let mut dist = vec![u64::MAX; n];
    // prev[v] = segment we came from; INVALID for unreached segments.
    let mut prev = vec![SegmentId::INVALID; n];

    dist[from.index()] = 0;

    // Min-heap: (cost, segment).  Secondary key SegmentId ensures
    // deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(u64, SegmentId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, seg))) = heap.pop() {
        if seg == to {
            return Ok(reconstruct(network, &prev, from, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[seg.index()] {
            continue;
        }

        for &next in network.successors(seg) {
            if avoid.contains(&next) {
                continue;
            }
            let new_cost = cost.saturating_add(scaled(weight(next)));
            if new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                prev[next.index()] = seg;
                heap.push(Reverse((new_cost, next)));
            }
        }
    }

    Err(NetworkError::NoRoute { from, to })
}

fn reconstruct(
    network: &RoadNetwork,
    prev:    &[SegmentId],
    from:    SegmentId,
    to:      SegmentId,
    cost:    u64,
) -> Route {
    let mut segments = vec![to];
    let mut cur = to;
    while cur != from {
        cur = prev[cur.index()];
        segments.push(cur);
    }
    segments.reverse();

    let length_m = segments[1..]
        .iter()
        .filter_map(|&s| network.segment(s).ok())
        .map(|s| s.length_m)
        .sum();

    Route { segments, length_m, cost: cost as f32 / COST_SCALE }
}

//! The reroute planner.
//!
//! # Round loop
//!
//! 1. Derive one RNG stream per ant from the caller's RNG (sequentially).
//! 2. **Construct** every ant's walk against the current trails (optionally
//!    parallel with the `parallel` feature).  Dead-end ants are dropped.
//! 3. Keep the cheapest successful walk seen so far.
//! 4. **Update** the trails once: evaporate everything, then let every
//!    successful ant deposit `deposit / cost` on each edge it used.
//! 5. Stop at `max_rounds`, or once a walk exists and the best has not
//!    improved for `stagnation_rounds` rounds.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use erv_core::{SegmentId, SimRng, VehicleId};
use erv_network::RoadNetwork;

use crate::ant::{construct, AntPath, Terrain};
use crate::config::AcoConfig;
use crate::pheromone::{PheromoneMatrix, SharedPheromones, TrailUpdate};
use crate::RerouteResult;

// ── Request / outcome ─────────────────────────────────────────────────────────

/// One vehicle to move off the blocked corridor.
#[derive(Clone, Debug)]
pub struct RerouteRequest<'a> {
    pub vehicle: VehicleId,
    /// Segment the vehicle is on now; the detour starts here.
    pub current: SegmentId,
    /// The vehicle's planned route; its last entry is the destination.
    pub original_route: &'a [SegmentId],
    /// Segments the detour must not enter.
    pub forbidden: &'a BTreeSet<SegmentId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RerouteOutcome {
    /// A path from the current segment to the original destination that
    /// avoids every forbidden segment.
    Detour { route: Vec<SegmentId>, cost: f32 },
    /// No ant reached the destination; the vehicle keeps its route.
    NoAlternateRoute { original: Vec<SegmentId> },
}

impl RerouteOutcome {
    /// The route the vehicle should follow.
    pub fn route(&self) -> &[SegmentId] {
        match self {
            RerouteOutcome::Detour { route, .. }        => route,
            RerouteOutcome::NoAlternateRoute { original } => original,
        }
    }

    pub fn is_detour(&self) -> bool {
        matches!(self, RerouteOutcome::Detour { .. })
    }
}

// ── ReroutePlanner ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct ReroutePlanner {
    config: AcoConfig,
}

impl ReroutePlanner {
    pub fn new(config: AcoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AcoConfig {
        &self.config
    }

    /// Plan against the shared matrix and commit the resulting trail update
    /// under a single write lock.
    pub fn plan(
        &self,
        network:    &RoadNetwork,
        pheromones: &SharedPheromones,
        request:    &RerouteRequest<'_>,
        congestion: &(dyn Fn(SegmentId) -> f32 + Sync),
        rng:        &mut SimRng,
    ) -> RerouteResult<RerouteOutcome> {
        let mut local = pheromones.read().clone();
        let (outcome, update) = self.plan_local(network, &mut local, request, congestion, rng)?;
        pheromones.write().apply(&update);
        Ok(outcome)
    }

    /// Plan against a private matrix.
    ///
    /// `trails` is updated round by round and the same changes are returned
    /// as a [`TrailUpdate`] for the caller to commit to the shared matrix.
    ///
    /// # Errors
    ///
    /// `Network(UnknownSegment)` if the current segment or any route segment
    /// is not in the network.
    pub fn plan_local(
        &self,
        network:    &RoadNetwork,
        trails:     &mut PheromoneMatrix,
        request:    &RerouteRequest<'_>,
        congestion: &(dyn Fn(SegmentId) -> f32 + Sync),
        rng:        &mut SimRng,
    ) -> RerouteResult<(RerouteOutcome, TrailUpdate)> {
        let cfg    = &self.config;
        let mut update = TrailUpdate::new(cfg.evaporation_rate);

        network.segment(request.current)?;
        for &s in request.original_route {
            network.segment(s)?;
        }

        let no_alternate = || RerouteOutcome::NoAlternateRoute { original: request.original_route.to_vec() };
        let goal = match request.original_route.last() {
            Some(&g) if g != request.current && !request.forbidden.contains(&g) => g,
            _ => return Ok((no_alternate(), update)),
        };

        let cost = |s: SegmentId| {
            let length = network.segment(s).map(|seg| seg.length_m).unwrap_or(f32::MAX);
            length * (1.0 + congestion(s).clamp(0.0, 10.0))
        };

        let mut best: Option<AntPath> = None;
        let mut stagnant = 0usize;

        for round in 0..cfg.max_rounds.max(1) {
            let ant_rngs: Vec<SimRng> = (0..cfg.ants.max(1)).map(|i| rng.child(i as u64)).collect();

            let walks: Vec<AntPath> = {
                let terrain = Terrain {
                    network,
                    trails:    &*trails,
                    forbidden: request.forbidden,
                    cost:      &cost,
                    alpha:     cfg.alpha,
                    beta:      cfg.beta,
                };
                run_ants(&terrain, request.current, goal, ant_rngs)
            };

            let round_best = walks.iter().min_by(|a, b| compare(a, b));
            let improved = match (round_best, &best) {
                (Some(r), Some(b)) => compare(r, b) == Ordering::Less,
                (Some(_), None)    => true,
                (None, _)          => false,
            };
            if improved {
                best = round_best.cloned();
                stagnant = 0;
            } else {
                stagnant += 1;
            }

            trails.evaporate(cfg.evaporation_rate);
            let mut deposits = Vec::new();
            for walk in &walks {
                let amount = cfg.deposit / walk.cost.max(f32::EPSILON);
                for edge in walk.edges() {
                    trails.deposit(edge, amount);
                    deposits.push((edge, amount));
                }
            }
            update.rounds.push(deposits);

            debug!(
                vehicle = %request.vehicle,
                round,
                successful = walks.len(),
                best_cost = best.as_ref().map(|b| b.cost),
                stagnant,
                "aco round complete"
            );

            if best.is_some() && stagnant >= cfg.stagnation_rounds {
                break;
            }
        }

        let outcome = match best {
            Some(path) => RerouteOutcome::Detour { route: path.segments, cost: path.cost },
            None       => no_alternate(),
        };
        Ok((outcome, update))
    }
}

/// Cheaper first, then fewer segments, then lexicographically smaller.
fn compare(a: &AntPath, b: &AntPath) -> Ordering {
    a.cost
        .total_cmp(&b.cost)
        .then_with(|| a.segments.len().cmp(&b.segments.len()))
        .then_with(|| a.segments.cmp(&b.segments))
}

/// Build every ant of one round.  Output order follows ant order.
fn run_ants(terrain: &Terrain<'_>, start: SegmentId, goal: SegmentId, rngs: Vec<SimRng>) -> Vec<AntPath> {
    #[cfg(not(feature = "parallel"))]
    {
        rngs.into_iter()
            .filter_map(|mut rng| construct(terrain, start, goal, &mut rng))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        rngs.into_par_iter()
            .filter_map(|mut rng| construct(terrain, start, goal, &mut rng))
            .collect()
    }
}

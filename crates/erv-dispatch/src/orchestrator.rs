//! One accident's pipeline: score → select → reroute → dispatch.
//!
//! [`Orchestrator::run_cycle`] only reads the [`SimContext`] and writes to
//! state it is handed (its phase tracker, RNG and pheromone copy), so cycles
//! for different accidents can run concurrently.  Committing the result
//! (claiming the ERV, emitting, publishing trail updates) is the dispatcher's
//! job.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, info_span, warn};

use erv_congestion::CongestionScore;
use erv_core::{AccidentId, SegmentId, SimRng, Tick, VehicleId};
use erv_network::{DijkstraRouter, NetworkError, Route, Router};
use erv_reroute::{PheromoneMatrix, ReroutePlanner, RerouteOutcome, RerouteRequest, TrailUpdate};
use erv_select::{ErvProfile, ErvSelector, SelectError};

use crate::accident::{Accident, AccidentPhase, PhaseTracker};
use crate::config::EngineConfig;
use crate::context::SimContext;
use crate::instruction::BroadcastInstruction;
use crate::DispatchResult;

// ── Outcome types ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum FailureReason {
    /// No available, idle ERV can reach the accident.
    NoAvailableErv,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoAvailableErv => f.write_str("no available ERV"),
        }
    }
}

/// Everything a successful cycle decided.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchPlan {
    pub erv: VehicleId,
    /// The ERV's projected path, starting at its current segment and ending
    /// at the accident segment.
    pub erv_path: Vec<SegmentId>,
    pub erv_distance_m: f32,
    pub fitness: f32,
    pub generations: usize,
    /// New routes, ascending vehicle id.
    pub detours: Vec<(VehicleId, Vec<SegmentId>)>,
    /// Affected vehicles for which no detour was found; they keep their route.
    pub unchanged: Vec<VehicleId>,
    /// The dispatch record first, then one detour per rerouted vehicle.
    pub instructions: Vec<BroadcastInstruction>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    Dispatched(DispatchPlan),
    Failed(FailureReason),
    /// The accident was resolved mid-cycle; nothing may be emitted.
    Suppressed,
}

/// Result of one [`Orchestrator::run_cycle`].
#[derive(Clone, Debug)]
pub struct CycleReport {
    pub accident: AccidentId,
    pub outcome: CycleOutcome,
    /// Phases the cycle moved through, starting at `Detected`.
    pub phases: PhaseTracker,
    /// Scores of the accident neighbourhood, as used for the decision.
    pub scores: BTreeMap<SegmentId, CongestionScore>,
    /// Pheromone changes, one per planned vehicle, in planning order.
    pub trail_updates: Vec<TrailUpdate>,
}

/// Per-cycle inputs besides the shared context.
pub struct CycleInput<'a> {
    pub accident: &'a Accident,
    /// ERVs committed to other active accidents.
    pub busy: &'a BTreeSet<VehicleId>,
    pub now: Tick,
    /// Polled between stages.
    pub is_resolved: &'a dyn Fn() -> bool,
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

pub struct Orchestrator<R: Router = DijkstraRouter> {
    radius_m: f32,
    selector: ErvSelector,
    planner:  ReroutePlanner,
    router:   R,
}

impl<R: Router> Orchestrator<R> {
    pub fn new(config: &EngineConfig, router: R) -> Self {
        Self {
            radius_m: config.radius_m,
            selector: ErvSelector::new(config.ga.clone()),
            planner:  ReroutePlanner::new(config.aco.clone()),
            router,
        }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Run one accident through the state machine.
    ///
    /// Cancellation is checked before each stage: once `is_resolved` reports
    /// true the current stage is allowed to finish and the cycle ends as
    /// [`CycleOutcome::Suppressed`].
    ///
    /// # Errors
    ///
    /// Only malformed input fails the call (an accident or vehicle on a
    /// segment the network does not know).  A missing ERV is a
    /// [`CycleOutcome::Failed`], a vehicle without a detour keeps its route.
    pub fn run_cycle(
        &self,
        ctx:    &SimContext,
        input:  &CycleInput<'_>,
        trails: &mut PheromoneMatrix,
        rng:    &mut SimRng,
    ) -> DispatchResult<CycleReport> {
        let accident = input.accident;
        let now      = input.now;
        let _span    = info_span!("accident_cycle", accident = %accident.id).entered();

        let mut report = CycleReport {
            accident:      accident.id,
            outcome:       CycleOutcome::Suppressed,
            phases:        PhaseTracker::new(accident.id, now),
            scores:        BTreeMap::new(),
            trail_updates: Vec::new(),
        };

        // ── Detected → CongestionScored ───────────────────────────────────
        if (input.is_resolved)() {
            return Ok(report);
        }
        let center = ctx.network.segment(accident.segment)?.midpoint;
        let mut nearby = ctx.network.segments_within(center, self.radius_m);
        if let Err(pos) = nearby.binary_search(&accident.segment) {
            nearby.insert(pos, accident.segment);
        }
        report.scores = ctx.scores.refresh_all(&ctx.network, &nearby, now)?;
        report.phases.advance(AccidentPhase::CongestionScored, now)?;
        debug!(
            segments = report.scores.len(),
            stale = report.scores.values().filter(|s| s.stale).count(),
            "neighbourhood scored"
        );

        // ── CongestionScored → ErvAssigned ────────────────────────────────
        if (input.is_resolved)() {
            return Ok(report);
        }
        let (profiles, mut paths) = self.erv_profiles(ctx, accident, input.busy, now)?;
        let selection = match self.selector.select(&profiles, rng) {
            Ok(sel) => sel,
            Err(SelectError::NoAvailableErv) => {
                report.phases.advance(AccidentPhase::Failed, now)?;
                report.outcome = CycleOutcome::Failed(FailureReason::NoAvailableErv);
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        };
        let erv_route = paths.remove(&selection.erv).unwrap_or_else(|| Route {
            segments: vec![accident.segment],
            length_m: 0.0,
            cost:     0.0,
        });
        report.phases.advance(AccidentPhase::ErvAssigned, now)?;
        debug!(
            erv = %selection.erv,
            fitness = selection.fitness,
            generations = selection.generations,
            candidates = profiles.len(),
            "erv selected"
        );

        // ── ErvAssigned → ReroutesIssued ──────────────────────────────────
        if (input.is_resolved)() {
            return Ok(report);
        }
        let mut forbidden: BTreeSet<SegmentId> = erv_route.segments.iter().copied().collect();
        forbidden.insert(accident.segment);
        let involved: BTreeSet<VehicleId> = accident.involved.iter().copied().collect();
        let congestion = |s: SegmentId| ctx.scores.value(&ctx.network, s, now);

        let mut detours   = Vec::new();
        let mut unchanged = Vec::new();
        for vehicle in ctx.vehicles.civilians() {
            if involved.contains(&vehicle.id) || !vehicle.route_intersects(&forbidden) {
                continue;
            }
            let request = RerouteRequest {
                vehicle:        vehicle.id,
                current:        vehicle.segment,
                original_route: vehicle.remaining_route(),
                forbidden:      &forbidden,
            };
            let (outcome, update) = self.planner.plan_local(&ctx.network, trails, &request, &congestion, rng)?;
            report.trail_updates.push(update);
            match outcome {
                RerouteOutcome::Detour { route, .. }      => detours.push((vehicle.id, route)),
                RerouteOutcome::NoAlternateRoute { .. } => unchanged.push(vehicle.id),
            }
        }
        report.phases.advance(AccidentPhase::ReroutesIssued, now)?;
        debug!(detours = detours.len(), unchanged = unchanged.len(), "reroutes planned");

        // ── ReroutesIssued → Dispatched ───────────────────────────────────
        if (input.is_resolved)() {
            return Ok(report);
        }
        let mut instructions = Vec::with_capacity(detours.len() + 1);
        instructions.push(BroadcastInstruction::Dispatch {
            erv:      selection.erv,
            accident: accident.id,
            path:     erv_route.segments.clone(),
        });
        instructions.extend(detours.iter().map(|(vehicle, route)| BroadcastInstruction::Detour {
            vehicle:  *vehicle,
            accident: accident.id,
            route:    route.clone(),
        }));
        report.phases.advance(AccidentPhase::Dispatched, now)?;

        report.outcome = CycleOutcome::Dispatched(DispatchPlan {
            erv:            selection.erv,
            erv_path:       erv_route.segments,
            erv_distance_m: erv_route.length_m,
            fitness:        selection.fitness,
            generations:    selection.generations,
            detours,
            unchanged,
            instructions,
        });
        Ok(report)
    }

    /// Profiles of every available, idle ERV that can reach the accident,
    /// with the congestion-weighted path each would take.
    fn erv_profiles(
        &self,
        ctx:      &SimContext,
        accident: &Accident,
        busy:     &BTreeSet<VehicleId>,
        now:      Tick,
    ) -> DispatchResult<(Vec<ErvProfile>, BTreeMap<VehicleId, Route>)> {
        let weight = |s: SegmentId| {
            let length = ctx.network.segment(s).map(|seg| seg.length_m).unwrap_or(0.0);
            length * (1.0 + ctx.scores.value(&ctx.network, s, now))
        };
        let no_avoid = BTreeSet::new();

        let mut profiles = Vec::new();
        let mut paths    = BTreeMap::new();
        for erv in ctx.vehicles.available_ervs() {
            if busy.contains(&erv.id) {
                continue;
            }
            let route = match self.router.route(&ctx.network, erv.segment, accident.segment, &weight, &no_avoid) {
                Ok(route) => route,
                Err(NetworkError::NoRoute { .. }) => {
                    warn!(erv = %erv.id, from = %erv.segment, "erv cannot reach accident");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let path_congestion = route
                .segments
                .iter()
                .map(|&s| ctx.scores.value(&ctx.network, s, now))
                .sum::<f32>()
                / route.segments.len().max(1) as f32;

            profiles.push(ErvProfile {
                erv:        erv.id,
                distance_m: route.length_m,
                path_congestion,
                readiness:  erv.readiness().unwrap_or(0.0),
            });
            paths.insert(erv.id, route);
        }
        Ok((profiles, paths))
    }
}

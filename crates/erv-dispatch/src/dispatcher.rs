//! The `Dispatcher`: feeds, accident registry, and the two-phase step.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use erv_core::{AccidentId, SegmentId, SimClock, SimRng, Tick, VehicleId, VehicleState};
use erv_network::{DijkstraRouter, Router};
use erv_reroute::{PheromoneMatrix, SharedPheromones, TrailUpdate};

use crate::accident::{Accident, AccidentPhase, AccidentStatus, PhaseTracker};
use crate::config::EngineConfig;
use crate::context::SimContext;
use crate::instruction::Broadcast;
use crate::observer::DispatchObserver;
use crate::orchestrator::{CycleInput, CycleOutcome, CycleReport, DispatchPlan, FailureReason, Orchestrator};
use crate::sink::BroadcastSink;
use crate::{DispatchError, DispatchResult};

// ── ResolutionHandle ──────────────────────────────────────────────────────────

/// Thread-safe record of resolved accidents.
///
/// Clone it out of the dispatcher to resolve accidents from another thread
/// while a step is running; cycles poll it between stages.
#[derive(Clone, Default, Debug)]
pub struct ResolutionHandle {
    resolved: Arc<RwLock<BTreeSet<AccidentId>>>,
}

impl ResolutionHandle {
    pub fn resolve(&self, id: AccidentId) {
        self.resolved.write().insert(id);
    }

    pub fn is_resolved(&self, id: AccidentId) -> bool {
        self.resolved.read().contains(&id)
    }
}

// ── AccidentEntry ─────────────────────────────────────────────────────────────

/// Registry record for one accident.
#[derive(Clone, Debug)]
pub struct AccidentEntry {
    pub accident: Accident,
    /// Committed phase and transition history.
    pub tracker: PhaseTracker,
    pub assigned_erv: Option<VehicleId>,
    /// Why the last cycle failed, while the accident is `Failed`.
    pub failure: Option<FailureReason>,
    /// Cycles computed for this accident, including deferred ones.
    pub attempts: u32,
    /// The committed dispatch, once there is one.
    pub plan: Option<DispatchPlan>,
}

impl AccidentEntry {
    #[inline]
    pub fn phase(&self) -> AccidentPhase {
        self.tracker.phase()
    }
}

// ── StepReport ────────────────────────────────────────────────────────────────

/// Counts for one [`Dispatcher::step`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub tick: Tick,
    /// Accidents whose cycle was computed this step.
    pub processed: usize,
    pub dispatched: usize,
    pub failed: usize,
    pub suppressed: usize,
    pub deferred: usize,
    /// Broadcasts handed to the sink.
    pub broadcasts: usize,
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Owns the simulation context and drives every accident through its cycle.
///
/// Create via [`DispatcherBuilder`][crate::DispatcherBuilder].
pub struct Dispatcher<R: Router = DijkstraRouter> {
    pub(crate) config:       EngineConfig,
    pub(crate) ctx:          SimContext,
    pub(crate) orchestrator: Orchestrator<R>,
    pub(crate) pheromones:   SharedPheromones,
    /// Active accidents.  Entries are dropped once resolved.
    pub(crate) accidents:    BTreeMap<AccidentId, AccidentEntry>,
    /// Resolved accident ids and the phase each one ended in.
    pub(crate) resolved:     BTreeMap<AccidentId, AccidentPhase>,
    pub(crate) resolutions:  ResolutionHandle,
    /// ERV → the active accident it is committed to.
    pub(crate) busy:         BTreeMap<VehicleId, AccidentId>,
    pub(crate) clock:        SimClock,
}

impl<R: Router> Dispatcher<R> {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn pheromones(&self) -> &SharedPheromones {
        &self.pheromones
    }

    pub fn resolution_handle(&self) -> ResolutionHandle {
        self.resolutions.clone()
    }

    pub fn accident(&self, id: AccidentId) -> Option<&AccidentEntry> {
        self.accidents.get(&id)
    }

    /// Unresolved accidents, ascending id.
    pub fn accidents(&self) -> impl Iterator<Item = &AccidentEntry> {
        self.accidents.values()
    }

    /// Phase a resolved accident was in when it was cleared.
    pub fn resolved_phase(&self, id: AccidentId) -> Option<AccidentPhase> {
        self.resolved.get(&id).copied()
    }

    pub fn is_resolved(&self, id: AccidentId) -> bool {
        self.resolved.contains_key(&id)
    }

    /// ERVs committed to an active accident, ascending ERV id.
    pub fn busy_ervs(&self) -> impl Iterator<Item = (VehicleId, AccidentId)> + '_ {
        self.busy.iter().map(|(&erv, &acc)| (erv, acc))
    }

    // ── State feed ────────────────────────────────────────────────────────

    /// Append a traffic sample at the current tick and drop the segment's
    /// cached score.
    pub fn record_sample(&self, segment: SegmentId, vehicle_count: u32, avg_speed_mps: f32) -> DispatchResult<()> {
        self.ctx.network.record_sample(segment, vehicle_count, avg_speed_mps, self.now())?;
        self.ctx.scores.invalidate(segment);
        Ok(())
    }

    /// Insert or replace a vehicle's reported state.
    ///
    /// # Errors
    ///
    /// `Network(UnknownSegment)` if the vehicle or its route is off the
    /// network; `Core(InvalidVehicle)` for an impossible speed, position or
    /// readiness.
    pub fn update_vehicle_state(&self, state: VehicleState) -> DispatchResult<()> {
        state.validate()?;
        self.ctx.network.segment(state.segment)?;
        for &s in &state.route {
            self.ctx.network.segment(s)?;
        }
        self.ctx.vehicles.upsert(state);
        Ok(())
    }

    pub fn remove_vehicle(&self, id: VehicleId) -> Option<VehicleState> {
        self.ctx.vehicles.remove(id)
    }

    // ── Accident feed ─────────────────────────────────────────────────────

    /// Register a newly detected accident; it is processed on the next step.
    pub fn on_accident_detected(&mut self, mut accident: Accident) -> DispatchResult<()> {
        self.ctx.network.segment(accident.segment)?;
        if self.accidents.contains_key(&accident.id) || self.resolved.contains_key(&accident.id) {
            return Err(DispatchError::DuplicateAccident(accident.id));
        }
        accident.status = AccidentStatus::Active;
        info!(accident = %accident.id, segment = %accident.segment, "accident detected");

        let tracker = PhaseTracker::new(accident.id, self.now());
        self.accidents.insert(accident.id, AccidentEntry {
            accident,
            tracker,
            assigned_erv: None,
            failure:      None,
            attempts:     0,
            plan:         None,
        });
        Ok(())
    }

    /// Mark an accident cleared and release its ERV.  Resolving an
    /// already resolved accident is a no-op.
    pub fn on_accident_resolved(&mut self, id: AccidentId) -> DispatchResult<()> {
        if self.resolved.contains_key(&id) {
            return Ok(());
        }
        if !self.accidents.contains_key(&id) {
            return Err(DispatchError::UnknownAccident(id));
        }
        self.resolutions.resolve(id);
        self.sync_resolutions();
        Ok(())
    }

    /// Send a `Failed` accident back to `Detected` for another attempt.
    pub fn retrigger(&mut self, id: AccidentId) -> DispatchResult<()> {
        self.sync_resolutions();
        if let Some(&from) = self.resolved.get(&id) {
            return Err(DispatchError::InvalidTransition { accident: id, from, to: AccidentPhase::Detected });
        }
        let now   = self.now();
        let entry = self.accidents.get_mut(&id).ok_or(DispatchError::UnknownAccident(id))?;
        entry.tracker.advance(AccidentPhase::Detected, now)?;
        entry.failure = None;
        info!(accident = %id, "accident re-triggered");
        Ok(())
    }

    // ── Step ──────────────────────────────────────────────────────────────

    /// Process every active accident in `Detected`, emit the results to
    /// `sink`, and advance the clock by one tick.
    pub fn step<S: BroadcastSink, O: DispatchObserver>(
        &mut self,
        sink:     &mut S,
        observer: &mut O,
    ) -> DispatchResult<StepReport> {
        let now = self.now();
        observer.on_step_start(now);
        self.sync_resolutions();

        // ── Phase 1: collect pending accidents (ascending id) ─────────────
        let pending: Vec<Accident> = self
            .accidents
            .values()
            .filter(|e| e.phase() == AccidentPhase::Detected)
            .map(|e| e.accident.clone())
            .collect();
        let busy: BTreeSet<VehicleId> = self.busy.keys().copied().collect();
        let base = self.pheromones.read().clone();

        // ── Phase 2: compute cycles (produce) ─────────────────────────────
        let cycles = self.compute_cycles(&pending, &busy, &base, now);

        // ── Phase 3: apply in ascending AccidentId order (consume) ────────
        let mut report = StepReport { tick: now, processed: pending.len(), ..StepReport::default() };
        for (accident, cycle) in pending.iter().zip(cycles) {
            self.apply_cycle(accident, cycle?, now, sink, observer, &mut report)?;
        }
        self.sync_resolutions();

        self.clock.advance();
        observer.on_step_end(&report);
        Ok(report)
    }

    /// Run `n` steps, returning each step's report.
    pub fn run_steps<S: BroadcastSink, O: DispatchObserver>(
        &mut self,
        n:        u64,
        sink:     &mut S,
        observer: &mut O,
    ) -> DispatchResult<Vec<StepReport>> {
        (0..n).map(|_| self.step(sink, observer)).collect()
    }

    /// Run one cycle per pending accident.
    ///
    /// Every cycle gets its own RNG stream and its own copy of the pheromone
    /// matrix, so with the `parallel` feature the results are identical to
    /// the sequential run.
    fn compute_cycles(
        &self,
        pending: &[Accident],
        busy:    &BTreeSet<VehicleId>,
        base:    &PheromoneMatrix,
        now:     Tick,
    ) -> Vec<DispatchResult<CycleReport>> {
        let seed         = self.config.seed;
        let ctx          = &self.ctx;
        let orchestrator = &self.orchestrator;
        let resolutions  = &self.resolutions;

        let run = |accident: &Accident| -> DispatchResult<CycleReport> {
            let id          = accident.id;
            let mut rng     = SimRng::stream(seed, id.0 as u64);
            let mut trails  = base.clone();
            let is_resolved = || resolutions.is_resolved(id);
            let input = CycleInput { accident, busy, now, is_resolved: &is_resolved };
            orchestrator.run_cycle(ctx, &input, &mut trails, &mut rng)
        };

        #[cfg(not(feature = "parallel"))]
        {
            pending.iter().map(run).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            pending.par_iter().map(run).collect()
        }
    }

    /// Commit one computed cycle during the sequential apply phase.
    fn apply_cycle<S: BroadcastSink, O: DispatchObserver>(
        &mut self,
        accident: &Accident,
        cycle:    CycleReport,
        now:      Tick,
        sink:     &mut S,
        observer: &mut O,
        report:   &mut StepReport,
    ) -> DispatchResult<()> {
        let id = accident.id;

        if self.resolutions.is_resolved(id) || cycle.outcome == CycleOutcome::Suppressed {
            self.commit_trails(&cycle.trail_updates);
            self.bump_attempts(id);
            warn!(accident = %id, "accident resolved mid-cycle; broadcasts suppressed");
            observer.on_suppressed(id);
            report.suppressed += 1;
            return Ok(());
        }

        match cycle.outcome {
            CycleOutcome::Failed(reason) => {
                self.commit_trails(&cycle.trail_updates);
                warn!(accident = %id, reason = %reason, "accident failed");
                self.commit_phases(id, cycle.phases, observer);
                if let Some(entry) = self.accidents.get_mut(&id) {
                    entry.attempts += 1;
                    entry.failure = Some(reason.clone());
                }
                observer.on_failed(id, &reason);
                report.failed += 1;
            }

            CycleOutcome::Dispatched(plan) => {
                if let Some(&holder) = self.busy.get(&plan.erv) {
                    self.bump_attempts(id);
                    info!(accident = %id, erv = %plan.erv, claimed_by = %holder, "erv already claimed; deferring");
                    observer.on_deferred(id, plan.erv);
                    report.deferred += 1;
                    return Ok(());
                }

                self.commit_trails(&cycle.trail_updates);
                self.busy.insert(plan.erv, id);

                let origin_rsu = self
                    .ctx
                    .network
                    .segment(accident.segment)
                    .ok()
                    .and_then(|seg| self.ctx.network.nearest_rsu(seg.midpoint));
                for instruction in &plan.instructions {
                    sink.emit(&Broadcast { tick: now, origin_rsu, instruction: instruction.clone() })?;
                    report.broadcasts += 1;
                }

                info!(
                    accident = %id,
                    erv = %plan.erv,
                    distance_m = plan.erv_distance_m,
                    detours = plan.detours.len(),
                    unchanged = plan.unchanged.len(),
                    "erv dispatched"
                );
                self.commit_phases(id, cycle.phases, observer);
                let (erv, detours) = (plan.erv, plan.detours.len());
                if let Some(entry) = self.accidents.get_mut(&id) {
                    entry.attempts    += 1;
                    entry.assigned_erv = Some(erv);
                    entry.failure      = None;
                    entry.plan         = Some(plan);
                }
                observer.on_dispatched(id, erv, detours);
                report.dispatched += 1;
            }

            CycleOutcome::Suppressed => {}
        }
        Ok(())
    }

    fn commit_phases<O: DispatchObserver>(&mut self, id: AccidentId, phases: PhaseTracker, observer: &mut O) {
        for &(phase, tick) in phases.history().iter().skip(1) {
            info!(accident = %id, phase = %phase, "phase entered");
            observer.on_phase(id, phase, tick);
        }
        if let Some(entry) = self.accidents.get_mut(&id) {
            entry.tracker.absorb(phases);
        }
    }

    /// Publish trail updates to the shared matrix under one write lock.
    fn commit_trails(&self, updates: &[TrailUpdate]) {
        if updates.iter().all(TrailUpdate::is_empty) {
            return;
        }
        let mut matrix = self.pheromones.write();
        for update in updates {
            matrix.apply(update);
        }
    }

    fn bump_attempts(&mut self, id: AccidentId) {
        if let Some(entry) = self.accidents.get_mut(&id) {
            entry.attempts += 1;
        }
    }

    /// Drop accidents resolved through the handle and free their ERVs.
    fn sync_resolutions(&mut self) {
        let cleared: Vec<AccidentId> = self
            .accidents
            .keys()
            .copied()
            .filter(|&id| self.resolutions.is_resolved(id))
            .collect();
        for id in cleared {
            if let Some(entry) = self.accidents.remove(&id) {
                info!(accident = %id, phase = %entry.phase(), attempts = entry.attempts, "accident resolved");
                self.resolved.insert(id, entry.phase());
            }
        }
        let accidents = &self.accidents;
        self.busy.retain(|erv, acc| {
            let keep = accidents.contains_key(acc);
            if !keep {
                info!(erv = %erv, accident = %acc, "erv released");
            }
            keep
        });
    }
}

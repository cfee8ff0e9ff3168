//! Dispatcher observer trait for progress reporting and data collection.

use erv_core::{AccidentId, Tick, VehicleId};

use crate::accident::AccidentPhase;
use crate::dispatcher::StepReport;
use crate::orchestrator::FailureReason;

/// Callbacks invoked by [`Dispatcher::step`][crate::Dispatcher::step] during
/// the apply phase.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — dispatch counter
///
/// ```rust,ignore
/// struct Counter { dispatched: usize }
///
/// impl DispatchObserver for Counter {
///     fn on_dispatched(&mut self, _accident: AccidentId, _erv: VehicleId, _detours: usize) {
///         self.dispatched += 1;
///     }
/// }
/// ```
pub trait DispatchObserver {
    /// Called at the very start of each step, before any processing.
    fn on_step_start(&mut self, _tick: Tick) {}

    /// Called for every phase an accident's committed cycle entered, in order.
    fn on_phase(&mut self, _accident: AccidentId, _phase: AccidentPhase, _tick: Tick) {}

    /// Called once the accident's broadcasts were handed to the sink.
    fn on_dispatched(&mut self, _accident: AccidentId, _erv: VehicleId, _detours: usize) {}

    fn on_failed(&mut self, _accident: AccidentId, _reason: &FailureReason) {}

    /// The accident was resolved while its cycle was running; nothing was
    /// emitted.
    fn on_suppressed(&mut self, _accident: AccidentId) {}

    /// A lower-id accident claimed `erv` in the same step; the accident goes
    /// back to `Detected`.
    fn on_deferred(&mut self, _accident: AccidentId, _erv: VehicleId) {}

    /// Called at the end of each step.
    fn on_step_end(&mut self, _report: &StepReport) {}
}

/// A [`DispatchObserver`] that does nothing.
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}

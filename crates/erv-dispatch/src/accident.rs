//! Accidents and their per-accident state machine.

use std::fmt;

use erv_core::{AccidentId, SegmentId, Tick, VehicleId};

use crate::{DispatchError, DispatchResult};

// ── Accident ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccidentStatus {
    Active,
    Resolved,
}

/// A detected accident, as reported by the accident feed.
#[derive(Clone, Debug, PartialEq)]
pub struct Accident {
    pub id:          AccidentId,
    pub segment:     SegmentId,
    pub detected_at: Tick,
    pub status:      AccidentStatus,
    /// Vehicles involved in the collision.  They are never rerouted.
    pub involved:    Vec<VehicleId>,
}

impl Accident {
    pub fn new(id: AccidentId, segment: SegmentId, detected_at: Tick) -> Self {
        Self { id, segment, detected_at, status: AccidentStatus::Active, involved: Vec::new() }
    }

    pub fn with_involved(mut self, involved: Vec<VehicleId>) -> Self {
        self.involved = involved;
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == AccidentStatus::Active
    }
}

// ── AccidentPhase ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccidentPhase {
    Detected,
    CongestionScored,
    ErvAssigned,
    ReroutesIssued,
    Dispatched,
    Failed,
}

impl AccidentPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, AccidentPhase::Dispatched | AccidentPhase::Failed)
    }

    /// Allowed moves: one step forward along the pipeline, any non-terminal
    /// phase to `Failed`, and `Failed` back to `Detected` on re-trigger.
    pub fn can_transition_to(self, next: AccidentPhase) -> bool {
        use AccidentPhase::*;
        matches!(
            (self, next),
            (Detected, CongestionScored)
                | (CongestionScored, ErvAssigned)
                | (ErvAssigned, ReroutesIssued)
                | (ReroutesIssued, Dispatched)
                | (Failed, Detected)
        ) || (next == Failed && !self.is_terminal())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccidentPhase::Detected         => "detected",
            AccidentPhase::CongestionScored => "congestion_scored",
            AccidentPhase::ErvAssigned      => "erv_assigned",
            AccidentPhase::ReroutesIssued   => "reroutes_issued",
            AccidentPhase::Dispatched       => "dispatched",
            AccidentPhase::Failed           => "failed",
        }
    }
}

impl fmt::Display for AccidentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PhaseTracker ──────────────────────────────────────────────────────────────

/// Current phase of one accident plus the transitions it went through.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseTracker {
    accident: AccidentId,
    phase:    AccidentPhase,
    history:  Vec<(AccidentPhase, Tick)>,
}

impl PhaseTracker {
    /// Start in `Detected` at `tick`.
    pub fn new(accident: AccidentId, tick: Tick) -> Self {
        Self { accident, phase: AccidentPhase::Detected, history: vec![(AccidentPhase::Detected, tick)] }
    }

    #[inline]
    pub fn phase(&self) -> AccidentPhase {
        self.phase
    }

    /// Every phase entered, in order, with the tick it was entered at.
    pub fn history(&self) -> &[(AccidentPhase, Tick)] {
        &self.history
    }

    /// Move to `next`, rejecting transitions the state machine forbids.
    pub fn advance(&mut self, next: AccidentPhase, tick: Tick) -> DispatchResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(DispatchError::InvalidTransition { accident: self.accident, from: self.phase, to: next });
        }
        self.phase = next;
        self.history.push((next, tick));
        Ok(())
    }

    /// Append another tracker's transitions after its initial `Detected`
    /// entry and take over its phase.
    pub(crate) fn absorb(&mut self, other: PhaseTracker) {
        self.history.extend(other.history.into_iter().skip(1));
        self.phase = other.phase;
    }
}

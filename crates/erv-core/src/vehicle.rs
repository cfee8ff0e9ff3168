//! Vehicle state as reported by the simulator adapter.
//!
//! Every vehicle shares the same position/route fields; kind-specific data
//! lives in the [`VehicleKind`] variant.  The engine only ever reads these
//! records: they are replaced wholesale by the periodic state feed.

use std::collections::BTreeSet;

use crate::{CoreError, CoreResult, SegmentId, VehicleId};

/// What role a vehicle plays in the network.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleKind {
    /// Emergency response vehicle.
    Erv {
        /// Crew/equipment readiness in `[0, 1]`.
        readiness: f32,
        /// `false` while off duty or committed elsewhere.
        available: bool,
    },
    /// Vehicle that only forwards messages.
    Relay,
    /// Ordinary traffic.
    Civilian,
}

impl VehicleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleKind::Erv { .. } => "erv",
            VehicleKind::Relay      => "relay",
            VehicleKind::Civilian   => "civilian",
        }
    }
}

/// One vehicle's latest reported state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleState {
    pub id: VehicleId,
    pub kind: VehicleKind,
    /// Segment the vehicle is currently on.
    pub segment: SegmentId,
    /// Distance travelled along `segment`, in metres.
    pub position_m: f32,
    /// Current speed in m/s.
    pub speed_mps: f32,
    /// Planned route as an ordered list of segments.  Normally contains
    /// `segment`; the last entry is the destination.
    pub route: Vec<SegmentId>,
}

impl VehicleState {
    /// A civilian vehicle on `route`, currently on its first segment.
    pub fn civilian(id: VehicleId, route: Vec<SegmentId>) -> Self {
        let segment = route.first().copied().unwrap_or_default();
        Self {
            id,
            kind: VehicleKind::Civilian,
            segment,
            position_m: 0.0,
            speed_mps: 0.0,
            route,
        }
    }

    /// A parked ERV on `segment` with the given readiness.
    pub fn erv(id: VehicleId, segment: SegmentId, readiness: f32) -> Self {
        Self {
            id,
            kind: VehicleKind::Erv { readiness: readiness.clamp(0.0, 1.0), available: true },
            segment,
            position_m: 0.0,
            speed_mps: 0.0,
            route: vec![segment],
        }
    }

    #[inline]
    pub fn is_civilian(&self) -> bool {
        matches!(self.kind, VehicleKind::Civilian)
    }

    /// `true` for an ERV whose availability flag is set.
    #[inline]
    pub fn is_available_erv(&self) -> bool {
        matches!(self.kind, VehicleKind::Erv { available: true, .. })
    }

    /// Readiness clamped to `[0, 1]`; `None` for non-ERVs.
    pub fn readiness(&self) -> Option<f32> {
        match self.kind {
            VehicleKind::Erv { readiness, .. } => Some(readiness.clamp(0.0, 1.0)),
            _ => None,
        }
    }

    /// Final segment of the planned route.
    pub fn destination(&self) -> Option<SegmentId> {
        self.route.last().copied()
    }

    /// The part of the route still ahead, starting at the current segment.
    ///
    /// Falls back to the whole route when the current segment is not on it
    /// (the simulator sometimes reports a junction-internal segment).
    pub fn remaining_route(&self) -> &[SegmentId] {
        match self.route.iter().position(|&s| s == self.segment) {
            Some(i) => &self.route[i..],
            None => &self.route,
        }
    }

    /// `true` if any segment still ahead is in `segments`.
    pub fn route_intersects(&self, segments: &BTreeSet<SegmentId>) -> bool {
        self.remaining_route().iter().any(|s| segments.contains(s))
    }

    /// Reject reports with a negative or non-finite speed or position, or a
    /// non-finite ERV readiness.
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |reason: String| Err(CoreError::InvalidVehicle { vehicle: self.id, reason });
        if !(self.speed_mps.is_finite() && self.speed_mps >= 0.0) {
            return invalid(format!("speed must be a non-negative number, got {}", self.speed_mps));
        }
        if !(self.position_m.is_finite() && self.position_m >= 0.0) {
            return invalid(format!("position must be a non-negative number, got {}", self.position_m));
        }
        if let VehicleKind::Erv { readiness, .. } = self.kind {
            if !readiness.is_finite() {
                return invalid(format!("readiness must be a number, got {readiness}"));
            }
        }
        Ok(())
    }
}

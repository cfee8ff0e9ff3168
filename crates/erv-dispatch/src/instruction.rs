//! Messages handed to the broadcast transport.

use erv_core::{AccidentId, RsuId, SegmentId, Tick, VehicleId};

/// One instruction for one vehicle.
#[derive(Clone, Debug, PartialEq)]
pub enum BroadcastInstruction {
    /// Send `erv` to `accident` along `path`.
    Dispatch { erv: VehicleId, accident: AccidentId, path: Vec<SegmentId> },
    /// Move `vehicle` onto `route` to clear the way for `accident`'s ERV.
    Detour { vehicle: VehicleId, accident: AccidentId, route: Vec<SegmentId> },
}

impl BroadcastInstruction {
    pub fn kind(&self) -> &'static str {
        match self {
            BroadcastInstruction::Dispatch { .. } => "dispatch",
            BroadcastInstruction::Detour { .. }   => "detour",
        }
    }

    /// The vehicle the instruction is addressed to.
    pub fn vehicle(&self) -> VehicleId {
        match self {
            BroadcastInstruction::Dispatch { erv, .. }   => *erv,
            BroadcastInstruction::Detour { vehicle, .. } => *vehicle,
        }
    }

    pub fn accident(&self) -> AccidentId {
        match self {
            BroadcastInstruction::Dispatch { accident, .. } | BroadcastInstruction::Detour { accident, .. } => {
                *accident
            }
        }
    }

    pub fn route(&self) -> &[SegmentId] {
        match self {
            BroadcastInstruction::Dispatch { path, .. } => path,
            BroadcastInstruction::Detour { route, .. }  => route,
        }
    }
}

/// Envelope the transport receives.
#[derive(Clone, Debug, PartialEq)]
pub struct Broadcast {
    pub tick: Tick,
    /// Roadside unit nearest the accident, where propagation should start.
    /// `None` when the network has no roadside units.
    pub origin_rsu: Option<RsuId>,
    pub instruction: BroadcastInstruction,
}

//! Candidate profiles and the fitness function.

use serde::{Deserialize, Serialize};

use erv_core::VehicleId;

/// Everything the selector knows about one available ERV for one accident.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ErvProfile {
    pub erv: VehicleId,
    /// Length of the ERV's shortest path to the accident, metres.
    pub distance_m: f32,
    /// Mean congestion score (0–10) along that path.
    pub path_congestion: f32,
    /// Readiness in `[0, 1]`.
    pub readiness: f32,
}

/// Weights of the three fitness terms.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub distance:   f32,
    pub congestion: f32,
    pub readiness:  f32,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self { distance: 0.5, congestion: 0.3, readiness: 0.2 }
    }
}

impl FitnessWeights {
    /// `w1·(1 − distance) + w2·(1 − congestion) + w3·readiness`, higher is
    /// better.
    #[inline]
    pub fn fitness(&self, n: &Normalized) -> f32 {
        self.distance * (1.0 - n.distance)
            + self.congestion * (1.0 - n.congestion)
            + self.readiness * n.readiness
    }
}

/// A profile with every term mapped into `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Normalized {
    pub erv:        VehicleId,
    pub distance:   f32,
    pub congestion: f32,
    pub readiness:  f32,
}

impl Normalized {
    /// Normalise a candidate set.
    ///
    /// Distance is divided by the largest distance in the set (all zeros when
    /// every candidate is on the spot), congestion by 10, and readiness is
    /// clamped.  Non-finite inputs count as the worst value of their term.
    pub fn from_profiles(profiles: &[ErvProfile]) -> Vec<Normalized> {
        let max_distance = profiles
            .iter()
            .map(|p| finite_or(p.distance_m, 0.0).max(0.0))
            .fold(0.0f32, f32::max);

        profiles
            .iter()
            .map(|p| Normalized {
                erv:        p.erv,
                distance:   if max_distance > 0.0 {
                    (finite_or(p.distance_m, max_distance) / max_distance).clamp(0.0, 1.0)
                } else {
                    0.0
                },
                congestion: (finite_or(p.path_congestion, 10.0) / 10.0).clamp(0.0, 1.0),
                readiness:  finite_or(p.readiness, 0.0).clamp(0.0, 1.0),
            })
            .collect()
    }
}

#[inline]
fn finite_or(x: f32, fallback: f32) -> f32 {
    if x.is_finite() { x } else { fallback }
}

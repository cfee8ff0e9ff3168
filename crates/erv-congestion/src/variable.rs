//! Linguistic input variables and the output fuzzy sets.

use serde::{Deserialize, Serialize};

use crate::membership::MembershipFn;
use crate::rules::CongestionLevel;

// ── LinguisticVariable ────────────────────────────────────────────────────────

/// A crisp input in `[0, 1]` partitioned into Low / Medium / High.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinguisticVariable {
    pub low:    MembershipFn,
    pub medium: MembershipFn,
    pub high:   MembershipFn,
}

impl LinguisticVariable {
    /// Degrees of `[low, medium, high]` for `x`.
    pub fn fuzzify(&self, x: f32) -> [f32; 3] {
        [self.low.degree(x), self.medium.degree(x), self.high.degree(x)]
    }

    pub fn sets(&self) -> [&MembershipFn; 3] {
        [&self.low, &self.medium, &self.high]
    }
}

impl Default for LinguisticVariable {
    /// Ruspini partition of `[0, 1]`: memberships at any point sum to 1.
    fn default() -> Self {
        Self {
            low:    MembershipFn::trapezoid(0.0, 0.0, 0.25, 0.5),
            medium: MembershipFn::triangle(0.25, 0.5, 0.75),
            high:   MembershipFn::trapezoid(0.5, 0.75, 1.0, 1.0),
        }
    }
}

// ── OutputSets ────────────────────────────────────────────────────────────────

/// Output fuzzy sets over the score axis `[0, 10]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputSets {
    pub low:       MembershipFn,
    pub medium:    MembershipFn,
    pub high:      MembershipFn,
    pub very_high: MembershipFn,
}

impl OutputSets {
    pub fn set(&self, level: CongestionLevel) -> &MembershipFn {
        match level {
            CongestionLevel::Low      => &self.low,
            CongestionLevel::Medium   => &self.medium,
            CongestionLevel::High     => &self.high,
            CongestionLevel::VeryHigh => &self.very_high,
        }
    }
}

impl Default for OutputSets {
    /// Congruent triangles (equal area), centred at 1.5, 4, 6.5 and 8.5.
    fn default() -> Self {
        Self {
            low:       MembershipFn::triangle(0.0, 1.5, 3.0),
            medium:    MembershipFn::triangle(2.5, 4.0, 5.5),
            high:      MembershipFn::triangle(5.0, 6.5, 8.0),
            very_high: MembershipFn::triangle(7.0, 8.5, 10.0),
        }
    }
}

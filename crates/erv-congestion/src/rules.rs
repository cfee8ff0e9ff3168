//! Output levels and the density × speed-ratio rule table.

use serde::{Deserialize, Serialize};

/// Linguistic congestion level produced by a rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl CongestionLevel {
    pub const ALL: [CongestionLevel; 4] = [
        CongestionLevel::Low,
        CongestionLevel::Medium,
        CongestionLevel::High,
        CongestionLevel::VeryHigh,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CongestionLevel::Low      => "low",
            CongestionLevel::Medium   => "medium",
            CongestionLevel::High     => "high",
            CongestionLevel::VeryHigh => "very_high",
        }
    }
}

/// Nine rules, one per (density, speed ratio) combination.
///
/// `table[d][s]` is the consequent for density term `d` and speed-ratio term
/// `s`, both indexed Low = 0, Medium = 1, High = 2.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleBase {
    pub table: [[CongestionLevel; 3]; 3],
}

impl RuleBase {
    #[inline]
    pub fn consequent(&self, density: usize, speed_ratio: usize) -> CongestionLevel {
        self.table[density][speed_ratio]
    }

    /// `true` if the consequent never falls as density rises and never rises
    /// as the speed ratio rises.  With a Ruspini input partition and
    /// equal-area output sets this makes the score monotone.
    pub fn is_monotone(&self) -> bool {
        let t = &self.table;
        (0..3).all(|s| t[0][s] <= t[1][s] && t[1][s] <= t[2][s])
            && (0..3).all(|d| t[d][0] >= t[d][1] && t[d][1] >= t[d][2])
    }
}

impl Default for RuleBase {
    fn default() -> Self {
        use CongestionLevel::*;
        Self {
            table: [
                // speed:   Low       Medium  High
                /* low  */ [Medium,   Low,    Low],
                /* med  */ [High,     Medium, Low],
                /* high */ [VeryHigh, High,   Medium],
            ],
        }
    }
}

//! The fuzzy congestion scorer.

use serde::{Deserialize, Serialize};

use erv_core::{SegmentId, Tick};
use erv_network::{RoadNetwork, RoadSegment, Sample};

use crate::board::CongestionScore;
use crate::rules::RuleBase;
use crate::variable::{LinguisticVariable, OutputSets};
use crate::{CongestionError, CongestionResult};

/// Upper end of the score scale.
pub const MAX_SCORE: f32 = 10.0;

/// Scores are rounded to this many steps per unit.
const SCORE_STEPS: f64 = 1e4;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Which sample data feeds the scorer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreInput {
    /// Most recent sample only.
    #[default]
    Latest,
    /// Mean count and speed over the segment's rolling window.
    WindowMean,
}

/// Membership breakpoints, rule table, and input selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    pub density:     LinguisticVariable,
    pub speed_ratio: LinguisticVariable,
    pub output:      OutputSets,
    pub rules:       RuleBase,
    pub input:       ScoreInput,
}

impl FuzzyConfig {
    /// Reject malformed membership functions and zero-area output sets.
    pub fn validate(&self) -> CongestionResult<()> {
        for (name, var) in [("density", &self.density), ("speed_ratio", &self.speed_ratio)] {
            if var.sets().iter().any(|m| !m.is_well_formed()) {
                return Err(CongestionError::Config(format!(
                    "{name}: membership breakpoints must be finite and ordered"
                )));
            }
        }
        for level in crate::CongestionLevel::ALL {
            let set = self.output.set(level);
            if !set.is_well_formed() || set.area() <= 0.0 {
                return Err(CongestionError::Config(format!(
                    "output set {} must be ordered with positive area",
                    level.as_str()
                )));
            }
        }
        Ok(())
    }
}

// ── CongestionScorer ──────────────────────────────────────────────────────────

/// Stateless Mamdani-style scorer.  Cheap to clone and `Sync`.
#[derive(Clone, Debug, Default)]
pub struct CongestionScorer {
    config: FuzzyConfig,
}

impl CongestionScorer {
    pub fn new(config: FuzzyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FuzzyConfig {
        &self.config
    }

    /// Score normalised inputs.  Both are clamped to `[0, 1]` first.
    ///
    /// Rule weights are accumulated in `f64` and the centroid is rounded to
    /// four decimals, so inputs on a plateau of the rule surface all map to
    /// the same value.
    pub fn infer(&self, density: f32, speed_ratio: f32) -> f32 {
        let density     = clamp_unit(density);
        let speed_ratio = clamp_unit(speed_ratio);

        let mu_d = self.config.density.fuzzify(density);
        let mu_s = self.config.speed_ratio.fuzzify(speed_ratio);

        let mut mass   = 0.0f64;
        let mut moment = 0.0f64;
        for (d, &wd) in mu_d.iter().enumerate() {
            if wd <= 0.0 {
                continue;
            }
            for (s, &ws) in mu_s.iter().enumerate() {
                let w = f64::from(wd) * f64::from(ws);
                if w <= 0.0 {
                    continue;
                }
                let set  = self.config.output.set(self.config.rules.consequent(d, s));
                let area = w * f64::from(set.area());
                mass   += area;
                moment += area * f64::from(set.centroid());
            }
        }

        if mass <= 0.0 {
            return 0.0;
        }
        let score = ((moment / mass) * SCORE_STEPS).round() / SCORE_STEPS;
        (score as f32).clamp(0.0, MAX_SCORE)
    }

    /// Score raw traffic values against a segment's static attributes.
    ///
    /// A zero vehicle count is 0 by definition.
    pub fn score_values(&self, vehicle_count: f32, avg_speed_mps: f32, segment: &RoadSegment) -> f32 {
        if vehicle_count <= 0.0 {
            return 0.0;
        }
        let density     = vehicle_count / segment.capacity.max(1) as f32;
        let speed_ratio = avg_speed_mps / segment.free_flow_mps;
        self.infer(density, speed_ratio)
    }

    pub fn score_sample(&self, sample: &Sample, segment: &RoadSegment) -> f32 {
        self.score_values(sample.vehicle_count as f32, sample.avg_speed_mps, segment)
    }

    /// Score segment `id` from the network's current samples.
    ///
    /// # Errors
    ///
    /// `Network(UnknownSegment)` for an id outside the network, `NoData` if
    /// nothing has been sampled on the segment yet.
    pub fn score(&self, network: &RoadNetwork, id: SegmentId, now: Tick) -> CongestionResult<CongestionScore> {
        let segment = network.segment(id)?;
        let (value, sample_tick) = match self.config.input {
            ScoreInput::Latest => {
                let sample = network.latest(id)?.ok_or(CongestionError::NoData(id))?;
                (self.score_sample(&sample, segment), sample.tick)
            }
            ScoreInput::WindowMean => {
                let window = network.window(id)?;
                let (count, speed) = window.mean().ok_or(CongestionError::NoData(id))?;
                let tick = window.latest().map(|s| s.tick).unwrap_or(now);
                (self.score_values(count, speed, segment), tick)
            }
        };
        Ok(CongestionScore {
            segment: id,
            value,
            computed_at: now,
            sample_tick: Some(sample_tick),
            stale: false,
        })
    }
}

#[inline]
fn clamp_unit(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

//! Engine configuration, loaded once at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use erv_congestion::FuzzyConfig;
use erv_core::SimClock;
use erv_reroute::AcoConfig;
use erv_select::GaConfig;

use crate::{DispatchError, DispatchResult};

/// Every tunable of the engine.
///
/// Missing JSON fields take their defaults, so a config file only needs the
/// values it changes:
///
/// ```
/// use erv_dispatch::EngineConfig;
///
/// let cfg = EngineConfig::from_json_str(r#"{ "seed": 7, "ga": { "population_size": 40 } }"#).unwrap();
/// assert_eq!(cfg.seed, 7);
/// assert_eq!(cfg.ga.population_size, 40);
/// assert_eq!(cfg.aco.ants, 12);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Global seed.  Accident `n` draws from stream `n` under this seed.
    pub seed: u64,
    /// A congestion score older than this many ticks is recomputed.
    pub freshness_ticks: u64,
    /// Segments whose midpoint lies within this distance of the accident are
    /// scored before selection.
    pub radius_m: f32,
    /// Wall-clock seconds per simulation tick.
    pub tick_duration_secs: f32,
    pub fuzzy: FuzzyConfig,
    pub ga: GaConfig,
    pub aco: AcoConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed:               42,
            freshness_ticks:    5,
            radius_m:           500.0,
            tick_duration_secs: 1.0,
            fuzzy:              FuzzyConfig::default(),
            ga:                 GaConfig::default(),
            aco:                AcoConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate.
    pub fn from_json_str(json: &str) -> DispatchResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_path(path: &Path) -> DispatchResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> DispatchResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every section; the first problem is reported as
    /// [`DispatchError::Config`].
    pub fn validate(&self) -> DispatchResult<()> {
        if !(self.radius_m.is_finite() && self.radius_m >= 0.0) {
            return Err(DispatchError::Config(format!("radius_m must be non-negative, got {}", self.radius_m)));
        }
        if !(self.tick_duration_secs.is_finite() && self.tick_duration_secs > 0.0) {
            return Err(DispatchError::Config(format!(
                "tick_duration_secs must be positive, got {}",
                self.tick_duration_secs
            )));
        }
        self.fuzzy.validate().map_err(|e| DispatchError::Config(e.to_string()))?;
        self.ga.validate().map_err(|e| DispatchError::Config(e.to_string()))?;
        self.aco.validate().map_err(|e| DispatchError::Config(e.to_string()))?;
        Ok(())
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_duration_secs)
    }
}

//! Ant-colony parameters.

use serde::{Deserialize, Serialize};

use crate::{RerouteError, RerouteResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcoConfig {
    /// Ants constructed per round.
    pub ants: usize,
    /// Hard cap on construction rounds per call.
    pub max_rounds: usize,
    /// Stop once a path exists and the best has not improved for this many
    /// consecutive rounds.
    pub stagnation_rounds: usize,
    /// Pheromone exponent.
    pub alpha: f32,
    /// Heuristic exponent.
    pub beta: f32,
    /// Fraction of every trail removed per round.
    pub evaporation_rate: f32,
    pub pheromone_floor: f32,
    pub initial_pheromone: f32,
    /// Pheromone laid by a successful ant is `deposit / path_cost`.
    pub deposit: f32,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            ants:              12,
            max_rounds:        20,
            stagnation_rounds: 5,
            alpha:             1.0,
            beta:              2.0,
            evaporation_rate:  0.1,
            pheromone_floor:   0.01,
            initial_pheromone: 1.0,
            deposit:           1.0,
        }
    }
}

impl AcoConfig {
    pub fn validate(&self) -> RerouteResult<()> {
        let fail = |msg: String| Err(RerouteError::Config(msg));
        for (name, v) in [
            ("ants", self.ants),
            ("max_rounds", self.max_rounds),
            ("stagnation_rounds", self.stagnation_rounds),
        ] {
            if v == 0 {
                return fail(format!("{name} must be at least 1"));
            }
        }
        for (name, v) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !v.is_finite() || v < 0.0 {
                return fail(format!("{name} must be a non-negative number, got {v}"));
            }
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return fail(format!("evaporation_rate must be in [0, 1], got {}", self.evaporation_rate));
        }
        if !(self.pheromone_floor.is_finite() && self.pheromone_floor > 0.0) {
            return fail(format!("pheromone_floor must be positive, got {}", self.pheromone_floor));
        }
        if !(self.initial_pheromone.is_finite() && self.initial_pheromone >= self.pheromone_floor) {
            return fail(format!(
                "initial_pheromone ({}) must be at least pheromone_floor ({})",
                self.initial_pheromone, self.pheromone_floor
            ));
        }
        if !(self.deposit.is_finite() && self.deposit > 0.0) {
            return fail(format!("deposit must be positive, got {}", self.deposit));
        }
        Ok(())
    }

    /// A fresh matrix with this configuration's initial trail and floor.
    pub fn new_matrix(&self) -> crate::PheromoneMatrix {
        crate::PheromoneMatrix::new(self.initial_pheromone, self.pheromone_floor)
    }
}

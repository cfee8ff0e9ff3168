//! Genetic-algorithm parameters.

use serde::{Deserialize, Serialize};

use crate::profile::FitnessWeights;
use crate::{SelectError, SelectResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Hard cap on generations evaluated.
    pub max_generations: usize,
    /// Stop once the best individual has not improved for this many
    /// consecutive generations.
    pub plateau_generations: usize,
    /// Individuals drawn per tournament.
    pub tournament_size: usize,
    /// Probability that a child takes a random parent's gene instead of
    /// cloning the first parent.
    pub crossover_rate: f64,
    /// Probability that a child's gene is replaced by a different candidate.
    pub mutation_rate: f64,
    pub weights: FitnessWeights,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size:     20,
            max_generations:     30,
            plateau_generations: 8,
            tournament_size:     3,
            crossover_rate:      0.8,
            mutation_rate:       0.1,
            weights:             FitnessWeights::default(),
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> SelectResult<()> {
        let fail = |msg: &str| Err(SelectError::Config(msg.to_owned()));
        if self.population_size == 0 {
            return fail("population_size must be at least 1");
        }
        if self.max_generations == 0 {
            return fail("max_generations must be at least 1");
        }
        if self.plateau_generations == 0 {
            return fail("plateau_generations must be at least 1");
        }
        if self.tournament_size == 0 {
            return fail("tournament_size must be at least 1");
        }
        for (name, rate) in [("crossover_rate", self.crossover_rate), ("mutation_rate", self.mutation_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SelectError::Config(format!("{name} must be in [0, 1], got {rate}")));
            }
        }
        let w = &self.weights;
        let terms = [w.distance, w.congestion, w.readiness];
        if terms.iter().any(|t| !t.is_finite() || *t < 0.0) || terms.iter().sum::<f32>() <= 0.0 {
            return fail("fitness weights must be non-negative with a positive sum");
        }
        Ok(())
    }
}

//! The genetic-algorithm selector.
//!
//! # Generation loop
//!
//! 1. **Evaluate** every individual's fitness (optionally parallel with the
//!    `parallel` feature).
//! 2. **Record** the generation's best individual, ranked by fitness
//!    descending, then normalised distance ascending, then ERV id ascending.
//! 3. **Stop** at `max_generations` or after `plateau_generations`
//!    generations without a strictly better best.
//! 4. **Breed** the next generation: the best individual first (elitism), then
//!    tournament-selected parents → crossover → mutation until full.
//!
//! All randomness comes from the caller's [`SimRng`], so a fixed seed and a
//! fixed candidate set reproduce the run exactly.

use std::cmp::Ordering;

use tracing::debug;

use erv_core::{SimRng, VehicleId};

use crate::config::GaConfig;
use crate::profile::{ErvProfile, FitnessWeights, Normalized};
use crate::{SelectError, SelectResult};

/// Index into the id-sorted candidate list.
type Gene = usize;

// ── Selection ─────────────────────────────────────────────────────────────────

/// Result of one selector run.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub erv: VehicleId,
    pub fitness: f32,
    /// Generations evaluated before stopping.
    pub generations: usize,
    /// Best fitness of each evaluated generation; never decreases.
    pub best_history: Vec<f32>,
}

// ── ErvSelector ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct ErvSelector {
    config: GaConfig,
}

impl ErvSelector {
    pub fn new(config: GaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Pick the responder among `candidates`.
    ///
    /// Candidates are sorted by id (duplicates dropped) before the run, so
    /// the caller's ordering does not affect the result.
    ///
    /// # Errors
    ///
    /// `NoAvailableErv` for an empty candidate set.
    pub fn select(&self, candidates: &[ErvProfile], rng: &mut SimRng) -> SelectResult<Selection> {
        if candidates.is_empty() {
            return Err(SelectError::NoAvailableErv);
        }

        let mut sorted = candidates.to_vec();
        sorted.sort_by_key(|c| c.erv);
        sorted.dedup_by_key(|c| c.erv);
        let table = Normalized::from_profiles(&sorted);

        let cfg     = &self.config;
        let size    = cfg.population_size.max(1);
        let k       = cfg.tournament_size.max(1);
        let weights = cfg.weights;

        let mut population = initial_population(table.len(), size, rng);
        let mut history: Vec<f32> = Vec::with_capacity(cfg.max_generations);
        let mut best: Option<(Gene, f32)> = None;
        let mut stall = 0usize;

        for generation in 0..cfg.max_generations.max(1) {
            let fitness = evaluate(&population, &table, &weights);

            let gen_best = (0..population.len())
                .min_by(|&a, &b| rank(&table, population[a], fitness[a], population[b], fitness[b]))
                .map(|i| (population[i], fitness[i]))
                .unwrap_or((0, f32::NEG_INFINITY));

            let improved = match best {
                None => true,
                Some((g, f)) => rank(&table, gen_best.0, gen_best.1, g, f) == Ordering::Less,
            };
            if improved {
                best  = Some(gen_best);
                stall = 0;
            } else {
                stall += 1;
            }
            history.push(gen_best.1);

            debug!(
                generation,
                best_erv = %table[gen_best.0].erv,
                best_fitness = gen_best.1,
                stall,
                "ga generation evaluated"
            );

            if stall >= cfg.plateau_generations || generation + 1 >= cfg.max_generations {
                break;
            }

            population = breed(&population, &fitness, &table, gen_best.0, size, k, cfg, rng);
        }

        let (gene, fitness) = best.unwrap_or((0, weights.fitness(&table[0])));
        Ok(Selection {
            erv:          table[gene].erv,
            fitness,
            generations:  history.len(),
            best_history: history,
        })
    }
}

// ── GA operators ──────────────────────────────────────────────────────────────

/// Every candidate appears at least once when there are no more candidates
/// than slots; the remaining slots are filled uniformly at random.
fn initial_population(candidates: usize, size: usize, rng: &mut SimRng) -> Vec<Gene> {
    let mut order: Vec<Gene> = (0..candidates).collect();
    rng.shuffle(&mut order);
    order.truncate(size);
    while order.len() < size {
        order.push(rng.gen_range(0..candidates));
    }
    order
}

fn evaluate(population: &[Gene], table: &[Normalized], weights: &FitnessWeights) -> Vec<f32> {
    #[cfg(not(feature = "parallel"))]
    {
        population.iter().map(|&g| weights.fitness(&table[g])).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        population.par_iter().map(|&g| weights.fitness(&table[g])).collect()
    }
}

/// Total order used for every comparison: `Less` means `a` is better.
fn rank(table: &[Normalized], a: Gene, fa: f32, b: Gene, fb: f32) -> Ordering {
    fb.total_cmp(&fa)
        .then_with(|| table[a].distance.total_cmp(&table[b].distance))
        .then_with(|| a.cmp(&b))
}

fn tournament(
    population: &[Gene],
    fitness:    &[f32],
    table:      &[Normalized],
    k:          usize,
    rng:        &mut SimRng,
) -> Gene {
    let mut winner = rng.gen_range(0..population.len());
    for _ in 1..k {
        let challenger = rng.gen_range(0..population.len());
        let order = rank(
            table,
            population[challenger], fitness[challenger],
            population[winner],     fitness[winner],
        );
        if order == Ordering::Less {
            winner = challenger;
        }
    }
    population[winner]
}

#[allow(clippy::too_many_arguments)]
fn breed(
    population: &[Gene],
    fitness:    &[f32],
    table:      &[Normalized],
    elite:      Gene,
    size:       usize,
    k:          usize,
    cfg:        &GaConfig,
    rng:        &mut SimRng,
) -> Vec<Gene> {
    let candidates = table.len();
    let mut next = Vec::with_capacity(size);
    next.push(elite);

    while next.len() < size {
        let p1 = tournament(population, fitness, table, k, rng);
        let p2 = tournament(population, fitness, table, k, rng);

        let mut child = if rng.gen_bool(cfg.crossover_rate) {
            if rng.gen_bool(0.5) { p1 } else { p2 }
        } else {
            p1
        };

        if candidates > 1 && rng.gen_bool(cfg.mutation_rate) {
            let r = rng.gen_range(0..candidates - 1);
            child = if r >= child { r + 1 } else { r };
        }
        next.push(child);
    }
    next
}

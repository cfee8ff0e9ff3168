//! Fluent builder for constructing a [`Dispatcher`].

use std::collections::BTreeMap;

use erv_congestion::CongestionScorer;
use erv_network::{DijkstraRouter, RoadNetwork, Router};
use erv_reroute::{shared, SharedPheromones};

use crate::config::EngineConfig;
use crate::context::SimContext;
use crate::dispatcher::{Dispatcher, ResolutionHandle};
use crate::orchestrator::Orchestrator;
use crate::DispatchResult;

/// Fluent builder for [`Dispatcher<R>`].
///
/// # Required inputs
///
/// - [`EngineConfig`] — seed, freshness, radius, fuzzy / GA / ACO sections
/// - [`RoadNetwork`] — the static topology from the simulator adapter
///
/// # Optional inputs (have defaults)
///
/// | Method             | Default                                  |
/// |--------------------|------------------------------------------|
/// | `.router(r)`       | [`DijkstraRouter`]                       |
/// | `.pheromones(p)`   | Fresh matrix from `config.aco`           |
///
/// # Example
///
/// ```rust,ignore
/// let mut dispatcher = DispatcherBuilder::new(config, network).build()?;
/// dispatcher.on_accident_detected(accident)?;
/// dispatcher.step(&mut sink, &mut NoopObserver)?;
/// ```
pub struct DispatcherBuilder<R: Router = DijkstraRouter> {
    config:     EngineConfig,
    network:    RoadNetwork,
    router:     R,
    pheromones: Option<SharedPheromones>,
}

impl DispatcherBuilder<DijkstraRouter> {
    pub fn new(config: EngineConfig, network: RoadNetwork) -> Self {
        Self { config, network, router: DijkstraRouter, pheromones: None }
    }
}

impl<R: Router> DispatcherBuilder<R> {
    /// Route ERVs with `router` instead of Dijkstra.
    pub fn router<R2: Router>(self, router: R2) -> DispatcherBuilder<R2> {
        DispatcherBuilder {
            config:     self.config,
            network:    self.network,
            router,
            pheromones: self.pheromones,
        }
    }

    /// Share an existing pheromone matrix (e.g. one carried over from an
    /// earlier run).
    pub fn pheromones(mut self, pheromones: SharedPheromones) -> Self {
        self.pheromones = Some(pheromones);
        self
    }

    /// Validate the configuration and return a ready-to-step [`Dispatcher`].
    pub fn build(self) -> DispatchResult<Dispatcher<R>> {
        self.config.validate()?;

        let scorer     = CongestionScorer::new(self.config.fuzzy.clone());
        let ctx        = SimContext::new(self.network, scorer, self.config.freshness_ticks);
        let pheromones = self.pheromones.unwrap_or_else(|| shared(self.config.aco.new_matrix()));

        Ok(Dispatcher {
            orchestrator: Orchestrator::new(&self.config, self.router),
            clock:        self.config.make_clock(),
            config:       self.config,
            ctx,
            pheromones,
            accidents:    BTreeMap::new(),
            resolved:     BTreeMap::new(),
            resolutions:  ResolutionHandle::default(),
            busy:         BTreeMap::new(),
        })
    }
}

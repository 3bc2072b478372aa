//! Expansion loop: select, admit, update

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::ExpansionConfig;
use crate::error::Result;
use crate::expansion::{Admission, ExpansionResult, ExpansionState, Termination};
use crate::graph::CompressedGraph;
use crate::module::{ModuleMetrics, SeedRegistry};
use crate::significance::{EngineStats, SignificanceEngine};

/// Owns the network, the module and the significance state for one run
#[derive(Debug)]
pub struct ExpansionDriver {
    graph: CompressedGraph,
    registry: SeedRegistry,
    engine: SignificanceEngine,
    config: ExpansionConfig,
    state: ExpansionState,
    admissions: Vec<Admission>,
    termination: Option<Termination>,
}

impl ExpansionDriver {
    /// Validate parameters and seeds, build the initial module and score its
    /// neighborhood. Any input problem surfaces here, before expansion starts.
    pub fn new(graph: CompressedGraph, seeds: &[String], config: ExpansionConfig) -> Result<Self> {
        config.validate()?;

        let registry = SeedRegistry::initialize(&graph, seeds, config.seed_policy)?;
        log::info!(
            "Network nodes: {}, seeds in network: {}",
            graph.node_count(),
            registry.seed_count()
        );

        let engine = SignificanceEngine::new(
            &graph,
            &registry,
            config.alpha,
            config.strategy,
            config.parallel_threshold,
        );

        Ok(Self {
            graph,
            registry,
            engine,
            config,
            state: ExpansionState::Running,
            admissions: Vec::new(),
            termination: None,
        })
    }

    pub fn state(&self) -> ExpansionState {
        self.state
    }

    pub fn graph(&self) -> &CompressedGraph {
        &self.graph
    }

    pub fn registry(&self) -> &SeedRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &SignificanceEngine {
        &self.engine
    }

    pub fn engine_stats(&self) -> EngineStats {
        self.engine.stats()
    }

    /// Admissions so far, in rank order
    pub fn admissions(&self) -> &[Admission] {
        &self.admissions
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    fn stop(&mut self, termination: Termination) {
        self.state = ExpansionState::Done;
        self.termination = Some(termination);
    }

    /// Run one iteration. Returns the admission, or `None` once the run is done.
    pub fn step(&mut self) -> Result<Option<Admission>> {
        if self.state == ExpansionState::Done {
            return Ok(None);
        }
        if self.admissions.len() >= self.config.num_nodes {
            self.stop(Termination::TargetReached);
            return Ok(None);
        }

        let Some(best) = self.engine.best_candidate(&self.graph, &self.registry) else {
            log::info!(
                "No more candidates connected to the module after {} admissions",
                self.admissions.len()
            );
            self.stop(Termination::CandidatesExhausted);
            return Ok(None);
        };

        self.registry.add(best.node, &self.graph)?;
        self.engine.admit(&self.graph, &self.registry, best.node);

        let admission = Admission {
            rank: self.admissions.len() + 1,
            gene: self.graph.node_id(best.node).to_string(),
            p_value: best.p_value(),
            ln_p: best.ln_p,
            weighted_links: best.weighted_links,
            degree: best.degree,
        };
        log::debug!(
            "Added node: {} (p={:.2e}) total added: {}/{}",
            admission.gene,
            admission.p_value,
            admission.rank,
            self.config.num_nodes
        );
        self.admissions.push(admission.clone());

        Ok(Some(admission))
    }

    /// Expand until the target count is reached or candidates run out
    pub fn run(self) -> Result<ExpansionResult> {
        self.run_with_cancel(&AtomicBool::new(false))
    }

    /// Like `run`, but checks `cancel` before every iteration and stops
    /// cleanly once it is set
    pub fn run_with_cancel(mut self, cancel: &AtomicBool) -> Result<ExpansionResult> {
        while self.state != ExpansionState::Done {
            if cancel.load(Ordering::Relaxed) {
                log::info!("Expansion cancelled after {} admissions", self.admissions.len());
                self.stop(Termination::Cancelled);
                break;
            }
            self.step()?;
        }
        Ok(self.finish())
    }

    /// Close the run and produce its result
    pub fn finish(mut self) -> ExpansionResult {
        if self.termination.is_none() {
            self.stop(Termination::Cancelled);
        }
        let termination = self.termination.unwrap_or(Termination::Cancelled);

        let stats = self.engine.stats();
        log::debug!(
            "Significance evaluations: {}, lazy refreshes: {}, discarded entries: {}",
            stats.evaluations,
            stats.refreshes,
            stats.discarded
        );

        let module = ModuleMetrics::compute(&self.graph, &self.registry);
        let seeds_used = self
            .registry
            .seeds()
            .iter()
            .map(|&n| self.graph.node_id(n).to_string())
            .collect();

        ExpansionResult {
            admissions: self.admissions,
            seeds_used,
            dropped_seeds: self.registry.dropped_seeds().to_vec(),
            termination,
            module,
        }
    }
}

/// Run a full expansion over `graph` from `seeds`
pub fn expand(graph: CompressedGraph, seeds: &[String], config: ExpansionConfig) -> Result<ExpansionResult> {
    ExpansionDriver::new(graph, seeds, config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpdateStrategy;
    use crate::graph::GraphBuilder;

    fn graph(edges: &[(&str, &str)]) -> CompressedGraph {
        let mut builder = GraphBuilder::new();
        for (a, b) in edges {
            builder.add_edge(a, b, None);
        }
        builder.build().unwrap()
    }

    fn seeds(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const FIVE: [(&str, &str); 5] = [("A", "B"), ("A", "C"), ("B", "C"), ("C", "D"), ("D", "E")];

    #[test]
    fn five_node_example_admits_c() {
        let result = expand(graph(&FIVE), &seeds(&["A", "B"]), ExpansionConfig::new(1, 1)).unwrap();
        assert_eq!(result.genes(), vec!["C"]);
        assert_eq!(result.termination, Termination::TargetReached);
        assert_eq!(result.admissions[0].rank, 1);
        assert_eq!(result.admissions[0].weighted_links, 2);
    }

    #[test]
    fn zero_target_is_empty_not_error() {
        let result = expand(graph(&FIVE), &seeds(&["A"]), ExpansionConfig::new(0, 1)).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.termination, Termination::TargetReached);
    }

    #[test]
    fn whole_network_seed_set_exhausts_immediately() {
        let all = seeds(&["A", "B", "C", "D", "E"]);
        let result = expand(graph(&FIVE), &all, ExpansionConfig::new(3, 1)).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.termination, Termination::CandidatesExhausted);
    }

    #[test]
    fn unreachable_component_stops_early() {
        let g = graph(&[("A", "B"), ("B", "C"), ("X", "Y")]);
        let result = expand(g, &seeds(&["A"]), ExpansionConfig::new(10, 1)).unwrap();
        assert_eq!(result.genes(), vec!["B", "C"]);
        assert_eq!(result.termination, Termination::CandidatesExhausted);
        assert_eq!(result.module.size, 3);
    }

    #[test]
    fn isolated_seed_yields_empty_result() {
        let mut builder = GraphBuilder::new();
        builder.add_edge("A", "B", None);
        builder.add_edge("S", "S", None);
        let result = expand(builder.build().unwrap(), &seeds(&["S"]), ExpansionConfig::new(5, 1)).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.termination, Termination::CandidatesExhausted);
    }

    #[test]
    fn step_reports_each_admission_then_done() {
        let mut driver =
            ExpansionDriver::new(graph(&FIVE), &seeds(&["A", "B"]), ExpansionConfig::new(2, 1)).unwrap();
        assert_eq!(driver.state(), ExpansionState::Running);

        let first = driver.step().unwrap().unwrap();
        let second = driver.step().unwrap().unwrap();
        assert_eq!((first.gene.as_str(), second.gene.as_str()), ("C", "D"));
        assert!(driver.step().unwrap().is_none());
        assert_eq!(driver.state(), ExpansionState::Done);
        assert_eq!(driver.termination(), Some(Termination::TargetReached));
        assert_eq!(driver.registry().ordered_members().len(), 4);
    }

    #[test]
    fn cancelled_before_start_admits_nothing() {
        let cancel = AtomicBool::new(true);
        let driver =
            ExpansionDriver::new(graph(&FIVE), &seeds(&["A"]), ExpansionConfig::new(4, 1)).unwrap();
        let result = driver.run_with_cancel(&cancel).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.module.admitted_count, 0);
        assert_eq!(result.module.size, 1);
    }

    #[test]
    fn cancellation_keeps_a_consistent_prefix() {
        let cancel = AtomicBool::new(false);
        let mut driver =
            ExpansionDriver::new(graph(&FIVE), &seeds(&["A"]), ExpansionConfig::new(4, 1)).unwrap();
        driver.step().unwrap();
        cancel.store(true, Ordering::Relaxed);
        let result = driver.run_with_cancel(&cancel).unwrap();
        assert_eq!(result.admissions.len(), 1);
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.module.admitted_count, 1);
    }

    #[test]
    fn huge_seed_weight_does_not_size_allocations() {
        let config = ExpansionConfig::new(1, 2_000_000_000);
        let result = expand(graph(&FIVE), &seeds(&["A", "B"]), config).unwrap();
        assert_eq!(result.genes(), vec!["C"]);
        let p = result.admissions[0].p_value;
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn full_recompute_matches_incremental() {
        let edges = [
            ("A", "B"), ("A", "C"), ("B", "C"), ("C", "D"), ("D", "E"),
            ("E", "F"), ("B", "F"), ("F", "G"), ("A", "G"), ("G", "H"),
        ];
        for alpha in [1, 3] {
            let incremental = expand(graph(&edges), &seeds(&["A"]), ExpansionConfig::new(10, alpha)).unwrap();
            let full = expand(
                graph(&edges),
                &seeds(&["A"]),
                ExpansionConfig::new(10, alpha).with_strategy(UpdateStrategy::FullRecompute),
            )
            .unwrap();
            assert_eq!(incremental.admissions, full.admissions);
        }
    }
}

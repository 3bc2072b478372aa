//! Incremental significance tracking for the expanding module
//!
//! Candidates live in a min-priority queue keyed by [`CandidateScore::priority_cmp`].
//! Admitting a node changes the connectivity of its neighbors only, so only
//! they are re-scored and re-queued; their older entries are invalidated by a
//! per-node version counter.
//!
//! Module growth also raises every other candidate's p-value (the upper tail
//! grows with the number of module elements in the population). Those entries
//! are refreshed lazily: an entry scored at an older module size is a lower
//! bound on its current key, so it is re-scored only when it reaches the top.
//! The first up-to-date entry at the top is therefore the true minimum.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rayon::prelude::*;

use crate::config::UpdateStrategy;
use crate::graph::CompressedGraph;
use crate::module::SeedRegistry;
use crate::significance::{CandidateScore, LogFactorials};

/// Queue entry: a score plus the state it was computed against
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    score: CandidateScore,
    version: u32,
    module_size: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .priority_cmp(&other.score)
            .then_with(|| other.module_size.cmp(&self.module_size))
    }
}

/// Work counters, useful to confirm the incremental path stays local
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// p-values computed
    pub evaluations: u64,

    /// Queue entries re-scored because the module grew
    pub refreshes: u64,

    /// Invalidated queue entries discarded
    pub discarded: u64,
}

/// Per-run significance state. Holds no reference to the network or module;
/// both are passed in, read-only, for every query.
#[derive(Debug)]
pub struct SignificanceEngine {
    table: LogFactorials,
    strategy: UpdateStrategy,
    parallel_threshold: usize,

    /// alpha - 1
    extra_weight: u64,
    seed_count: u64,

    /// N_eff
    population: u64,

    /// Module neighbors per node (unweighted)
    links: Vec<u32>,

    /// Seed neighbors per node, fixed for the run
    seed_links: Vec<u32>,

    version: Vec<u32>,
    heap: BinaryHeap<Reverse<HeapEntry>>,
    stats: EngineStats,
}

impl SignificanceEngine {
    /// Count module links for every node and score all seed-adjacent candidates
    pub fn new(
        graph: &CompressedGraph,
        registry: &SeedRegistry,
        alpha: u32,
        strategy: UpdateStrategy,
        parallel_threshold: usize,
    ) -> Self {
        let node_count = graph.node_count();
        let extra_weight = u64::from(alpha.max(1) - 1);
        let seed_count = registry.seed_count() as u64;
        let population = node_count as u64 + extra_weight * seed_count;

        let mut links = vec![0u32; node_count];
        let mut seed_links = vec![0u32; node_count];
        for &node in registry.ordered_members() {
            let is_seed = registry.is_seed(node);
            for &neighbor in graph.neighbors(node) {
                links[neighbor as usize] += 1;
                if is_seed {
                    seed_links[neighbor as usize] += 1;
                }
            }
        }

        let mut engine = Self {
            table: LogFactorials::new(node_count),
            strategy,
            parallel_threshold: parallel_threshold.max(1),
            extra_weight,
            seed_count,
            population,
            links,
            seed_links,
            version: vec![0; node_count],
            heap: BinaryHeap::new(),
            stats: EngineStats::default(),
        };

        if strategy == UpdateStrategy::Incremental {
            let candidates: Vec<u32> = (0..node_count as u32)
                .filter(|&node| !registry.contains(node) && engine.links[node as usize] > 0)
                .collect();
            log::debug!("Scoring {} initial candidates", candidates.len());
            engine.enqueue(graph, registry, &candidates);
        }

        engine
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Effective population size N_eff
    pub fn population(&self) -> u64 {
        self.population
    }

    /// Score a candidate from an explicit module-link count
    fn evaluate_with(
        &self,
        graph: &CompressedGraph,
        module_size: usize,
        node: u32,
        links: u32,
    ) -> CandidateScore {
        let seed_links = u64::from(self.seed_links[node as usize]);
        let degree = graph.degree(node) as u64;

        let weighted_links = u64::from(links) + self.extra_weight * seed_links;
        let successes = if seed_links > 0 {
            module_size as u64 + self.extra_weight * self.seed_count
        } else {
            module_size as u64
        };

        CandidateScore {
            node,
            ln_p: self
                .table
                .ln_upper_tail(self.population, successes, degree, weighted_links),
            weighted_links,
            degree: degree as u32,
            lexical_rank: graph.lexical_rank(node),
        }
    }

    /// Score a candidate from the maintained link counts
    pub fn score(&self, graph: &CompressedGraph, registry: &SeedRegistry, node: u32) -> CandidateScore {
        self.evaluate_with(graph, registry.size(), node, self.links[node as usize])
    }

    /// Score a batch, in parallel when the batch is large. Output order follows input.
    fn score_batch(
        &self,
        graph: &CompressedGraph,
        registry: &SeedRegistry,
        nodes: &[u32],
    ) -> Vec<CandidateScore> {
        if nodes.len() < self.parallel_threshold {
            nodes.iter().map(|&n| self.score(graph, registry, n)).collect()
        } else {
            nodes.par_iter().map(|&n| self.score(graph, registry, n)).collect()
        }
    }

    fn enqueue(&mut self, graph: &CompressedGraph, registry: &SeedRegistry, nodes: &[u32]) {
        let scores = self.score_batch(graph, registry, nodes);
        self.stats.evaluations += scores.len() as u64;
        let module_size = registry.size();
        for score in scores {
            self.heap.push(Reverse(HeapEntry {
                score,
                version: self.version[score.node as usize],
                module_size,
            }));
        }
    }

    /// Best eligible candidate for the current module, if any has a module link
    pub fn best_candidate(
        &mut self,
        graph: &CompressedGraph,
        registry: &SeedRegistry,
    ) -> Option<CandidateScore> {
        match self.strategy {
            UpdateStrategy::Incremental => self.best_from_queue(graph, registry),
            UpdateStrategy::FullRecompute => {
                let scores = self.full_scan(graph, registry);
                self.stats.evaluations += scores.len() as u64;
                scores.into_iter().min_by(|a, b| a.priority_cmp(b))
            }
        }
    }

    fn best_from_queue(
        &mut self,
        graph: &CompressedGraph,
        registry: &SeedRegistry,
    ) -> Option<CandidateScore> {
        let module_size = registry.size();
        while let Some(Reverse(entry)) = self.heap.pop() {
            let node = entry.score.node;
            if registry.contains(node) || entry.version != self.version[node as usize] {
                self.stats.discarded += 1;
                continue;
            }
            if entry.module_size != module_size {
                let score = self.score(graph, registry, node);
                self.stats.evaluations += 1;
                self.stats.refreshes += 1;
                self.heap.push(Reverse(HeapEntry {
                    score,
                    version: entry.version,
                    module_size,
                }));
                continue;
            }
            // Leave it queued; admission invalidates it through the version
            self.heap.push(Reverse(entry));
            return Some(entry.score);
        }
        None
    }

    /// Update connectivity after `node` joined the module.
    ///
    /// Must be called once per admission, after the registry has recorded it.
    pub fn admit(&mut self, graph: &CompressedGraph, registry: &SeedRegistry, node: u32) {
        self.version[node as usize] = self.version[node as usize].wrapping_add(1);

        let mut affected = Vec::with_capacity(graph.degree(node));
        for &neighbor in graph.neighbors(node) {
            self.links[neighbor as usize] += 1;
            if !registry.contains(neighbor) {
                self.version[neighbor as usize] = self.version[neighbor as usize].wrapping_add(1);
                affected.push(neighbor);
            }
        }

        if self.strategy == UpdateStrategy::Incremental {
            self.enqueue(graph, registry, &affected);
            self.compact(graph.node_count());
        }
    }

    /// Drop invalidated entries once they dominate the queue
    fn compact(&mut self, node_count: usize) {
        if self.heap.len() <= 2 * node_count + 64 {
            return;
        }
        let before = self.heap.len();
        let version = &self.version;
        self.heap
            .retain(|Reverse(entry)| entry.version == version[entry.score.node as usize]);
        let removed = before - self.heap.len();
        self.stats.discarded += removed as u64;
        log::debug!("Compacted candidate queue: removed {} stale entries", removed);
    }

    /// Recount module links from scratch and score every eligible candidate.
    ///
    /// Independent of the maintained counts; serves as the full-recomputation
    /// strategy and as a check on the incremental state.
    pub fn full_scan(&self, graph: &CompressedGraph, registry: &SeedRegistry) -> Vec<CandidateScore> {
        let module_size = registry.size();
        let evaluate = |node: u32| {
            if registry.contains(node) {
                return None;
            }
            let links = graph
                .neighbors(node)
                .iter()
                .filter(|&&n| registry.contains(n))
                .count() as u32;
            (links > 0).then(|| self.evaluate_with(graph, module_size, node, links))
        };

        let node_count = graph.node_count() as u32;
        if (node_count as usize) < self.parallel_threshold {
            (0..node_count).filter_map(evaluate).collect()
        } else {
            (0..node_count).into_par_iter().filter_map(evaluate).collect()
        }
    }

    /// Scores of all eligible candidates from the maintained counts
    pub fn tracked_scores(&self, graph: &CompressedGraph, registry: &SeedRegistry) -> Vec<CandidateScore> {
        (0..graph.node_count() as u32)
            .filter(|&node| !registry.contains(node) && self.links[node as usize] > 0)
            .map(|node| self.score(graph, registry, node))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedPolicy;
    use crate::graph::GraphBuilder;

    fn five_node_graph() -> CompressedGraph {
        let mut builder = GraphBuilder::new();
        for (a, b) in [("A", "B"), ("A", "C"), ("B", "C"), ("C", "D"), ("D", "E")] {
            builder.add_edge(a, b, None);
        }
        builder.build().unwrap()
    }

    fn registry(graph: &CompressedGraph, seeds: &[&str]) -> SeedRegistry {
        let seeds: Vec<String> = seeds.iter().map(|s| s.to_string()).collect();
        SeedRegistry::initialize(graph, &seeds, SeedPolicy::Strict).unwrap()
    }

    #[test]
    fn best_candidate_is_most_connected() {
        let graph = five_node_graph();
        let registry = registry(&graph, &["A", "B"]);
        let mut engine = SignificanceEngine::new(&graph, &registry, 1, UpdateStrategy::Incremental, 64);

        let best = engine.best_candidate(&graph, &registry).unwrap();
        assert_eq!(graph.node_id(best.node), "C");
        assert_eq!(best.weighted_links, 2);
        // C(2,2) * C(3,1) / C(5,3) = 3 / 10
        assert!((best.p_value() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn admission_rescores_only_neighbors() {
        let graph = five_node_graph();
        let mut registry = registry(&graph, &["A", "B"]);
        let mut engine = SignificanceEngine::new(&graph, &registry, 1, UpdateStrategy::Incremental, 64);
        let initial = engine.stats().evaluations;
        assert_eq!(initial, 1);

        let c = graph.index_of("C").unwrap();
        registry.add(c, &graph).unwrap();
        engine.admit(&graph, &registry, c);
        // C's only non-module neighbor is D
        assert_eq!(engine.stats().evaluations, initial + 1);

        let best = engine.best_candidate(&graph, &registry).unwrap();
        assert_eq!(graph.node_id(best.node), "D");
    }

    #[test]
    fn seed_weighting_inflates_links_and_population() {
        let graph = five_node_graph();
        let registry = registry(&graph, &["A", "B"]);
        let engine = SignificanceEngine::new(&graph, &registry, 3, UpdateStrategy::Incremental, 64);

        assert_eq!(engine.population(), 5 + 2 * 2);
        let c = graph.index_of("C").unwrap();
        let score = engine.score(&graph, &registry, c);
        assert_eq!(score.weighted_links, 2 + 2 * 2);
        assert_eq!(score.degree, 3);
        assert!(score.p_value() > 0.0 && score.p_value() <= 1.0);
    }

    #[test]
    fn full_scan_agrees_with_tracked_counts() {
        let graph = five_node_graph();
        let mut registry = registry(&graph, &["A"]);
        let mut engine = SignificanceEngine::new(&graph, &registry, 2, UpdateStrategy::Incremental, 64);

        for _ in 0..3 {
            let mut full = engine.full_scan(&graph, &registry);
            let mut tracked = engine.tracked_scores(&graph, &registry);
            full.sort_by_key(|s| s.node);
            tracked.sort_by_key(|s| s.node);
            assert_eq!(full, tracked);

            let best = engine.best_candidate(&graph, &registry).unwrap();
            registry.add(best.node, &graph).unwrap();
            engine.admit(&graph, &registry, best.node);
        }
    }

    #[test]
    fn exhausted_module_has_no_candidate() {
        let graph = five_node_graph();
        let registry = registry(&graph, &["A", "B", "C", "D", "E"]);
        let mut engine = SignificanceEngine::new(&graph, &registry, 1, UpdateStrategy::Incremental, 64);
        assert!(engine.best_candidate(&graph, &registry).is_none());

        let mut full = SignificanceEngine::new(&graph, &registry, 1, UpdateStrategy::FullRecompute, 64);
        assert!(full.best_candidate(&graph, &registry).is_none());
    }
}

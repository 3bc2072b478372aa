//! Module membership: initial seeds followed by admitted genes

pub mod metrics;

pub use metrics::ModuleMetrics;

use std::collections::HashSet;

use crate::config::SeedPolicy;
use crate::error::{ExpansionError, Result};
use crate::graph::CompressedGraph;

/// The growing module. Single source of truth for membership and admission order.
#[derive(Debug, Clone)]
pub struct SeedRegistry {
    /// Seeds first, then admitted nodes in admission order
    members: Vec<u32>,

    /// Membership flag per network node
    in_module: Vec<bool>,

    /// Original seed flag per network node
    is_seed: Vec<bool>,

    /// Number of leading `members` that are seeds
    seed_count: usize,

    /// Requested seeds absent from the network
    dropped: Vec<String>,
}

impl SeedRegistry {
    /// Resolve seed identifiers against the network.
    ///
    /// Unknown seeds are dropped and reported under `WarnAndDrop`, and fail
    /// the run under `Strict`. No known seed at all is always an error.
    pub fn initialize(
        graph: &CompressedGraph,
        seeds: &[String],
        policy: SeedPolicy,
    ) -> Result<Self> {
        let node_count = graph.node_count();
        let mut registry = Self {
            members: Vec::with_capacity(seeds.len()),
            in_module: vec![false; node_count],
            is_seed: vec![false; node_count],
            seed_count: 0,
            dropped: Vec::new(),
        };

        let mut seen = HashSet::with_capacity(seeds.len());
        for seed in seeds {
            if !seen.insert(seed.as_str()) {
                continue;
            }
            match graph.index_of(seed) {
                Some(node) => {
                    registry.members.push(node);
                    registry.in_module[node as usize] = true;
                    registry.is_seed[node as usize] = true;
                }
                None => registry.dropped.push(seed.clone()),
            }
        }
        registry.seed_count = registry.members.len();

        if !registry.dropped.is_empty() {
            if policy == SeedPolicy::Strict || registry.seed_count == 0 {
                return Err(ExpansionError::UnknownSeed {
                    seeds: registry.dropped,
                });
            }
            log::warn!(
                "Dropped {} seed genes not found in network: {}",
                registry.dropped.len(),
                registry.dropped.join(", ")
            );
        }
        if registry.seed_count == 0 {
            return Err(ExpansionError::InvalidParameter(
                "seed set is empty".to_string(),
            ));
        }

        Ok(registry)
    }

    pub fn contains(&self, node: u32) -> bool {
        self.in_module[node as usize]
    }

    /// Whether the node is one of the initial seeds
    pub fn is_seed(&self, node: u32) -> bool {
        self.is_seed[node as usize]
    }

    /// Admit a node to the module
    pub fn add(&mut self, node: u32, graph: &CompressedGraph) -> Result<()> {
        if self.contains(node) {
            return Err(ExpansionError::Duplicate(graph.node_id(node).to_string()));
        }
        self.in_module[node as usize] = true;
        self.members.push(node);
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn seed_count(&self) -> usize {
        self.seed_count
    }

    /// Seeds followed by admitted nodes
    pub fn ordered_members(&self) -> &[u32] {
        &self.members
    }

    pub fn seeds(&self) -> &[u32] {
        &self.members[..self.seed_count]
    }

    /// Nodes admitted after the seeds, in admission order
    pub fn admitted(&self) -> &[u32] {
        &self.members[self.seed_count..]
    }

    pub fn dropped_seeds(&self) -> &[String] {
        &self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn graph() -> CompressedGraph {
        let mut builder = GraphBuilder::new();
        builder.add_edge("A", "B", None);
        builder.add_edge("B", "C", None);
        builder.build().unwrap()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unknown_seeds_are_dropped_and_reported() {
        let graph = graph();
        let registry =
            SeedRegistry::initialize(&graph, &ids(&["A", "ZZZ"]), SeedPolicy::WarnAndDrop).unwrap();
        assert_eq!(registry.seed_count(), 1);
        assert_eq!(registry.dropped_seeds(), &["ZZZ".to_string()]);
    }

    #[test]
    fn strict_policy_rejects_unknown_seeds() {
        let graph = graph();
        let err = SeedRegistry::initialize(&graph, &ids(&["A", "ZZZ"]), SeedPolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, ExpansionError::UnknownSeed { seeds } if seeds == vec!["ZZZ"]));
    }

    #[test]
    fn no_known_seed_is_an_error_even_when_dropping() {
        let graph = graph();
        let err = SeedRegistry::initialize(&graph, &ids(&["X", "Y"]), SeedPolicy::WarnAndDrop)
            .unwrap_err();
        assert!(matches!(err, ExpansionError::UnknownSeed { .. }));
    }

    #[test]
    fn add_keeps_order_and_rejects_duplicates() {
        let graph = graph();
        let mut registry =
            SeedRegistry::initialize(&graph, &ids(&["A", "A"]), SeedPolicy::Strict).unwrap();
        let c = graph.index_of("C").unwrap();
        registry.add(c, &graph).unwrap();

        assert_eq!(registry.size(), 2);
        assert_eq!(registry.admitted(), &[c]);
        assert!(!registry.is_seed(c));
        assert!(matches!(
            registry.add(c, &graph),
            Err(ExpansionError::Duplicate(id)) if id == "C"
        ));
    }
}

//! Module statistics and metrics

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::graph::CompressedGraph;
use crate::module::SeedRegistry;

/// Number of hub genes reported per module
const TOP_HUBS: usize = 5;

/// Union-Find over module positions for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of element i)
    parent: Vec<u32>,

    /// Size of each set, valid at roots
    size: Vec<u32>,
}

impl DisjointSets {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path halving
    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Union the sets containing x and y, attaching the smaller under the larger
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }

        let (big, small) = if self.size[root_x as usize] >= self.size[root_y as usize] {
            (root_x, root_y)
        } else {
            (root_y, root_x)
        };
        self.parent[small as usize] = big;
        self.size[big as usize] += self.size[small as usize];
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.size[root as usize]
    }
}

/// Connectivity summary of the module-induced subgraph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleMetrics {
    pub size: usize,
    pub seed_count: usize,
    pub admitted_count: usize,

    /// Edges with both endpoints in the module
    pub internal_edges: usize,

    /// internal edges / potential undirected edges
    pub density: f64,

    /// Size of the largest connected component of the module subgraph
    pub largest_component: usize,

    /// Genes with the most neighbors inside the module
    pub hubs: Vec<String>,
}

impl ModuleMetrics {
    /// Calculate metrics for the current module
    pub fn compute(graph: &CompressedGraph, registry: &SeedRegistry) -> Self {
        let members = registry.ordered_members();
        let position: HashMap<u32, u32> = members
            .iter()
            .enumerate()
            .map(|(i, &node)| (node, i as u32))
            .collect();

        let mut sets = DisjointSets::new(members.len());
        let mut internal_degree = vec![0usize; members.len()];
        let mut internal_edges = 0usize;

        for (i, &node) in members.iter().enumerate() {
            for &neighbor in graph.neighbors(node) {
                if let Some(&j) = position.get(&neighbor) {
                    internal_degree[i] += 1;
                    if node < neighbor {
                        internal_edges += 1;
                        sets.union(i as u32, j);
                    }
                }
            }
        }

        let largest_component = (0..members.len() as u32)
            .map(|i| sets.size(i) as usize)
            .max()
            .unwrap_or(0);

        let n = members.len();
        let density = if n <= 1 {
            // By convention, singleton modules have density 1
            1.0
        } else {
            internal_edges as f64 / (n * (n - 1) / 2) as f64
        };

        let mut by_degree: Vec<(usize, u32)> = internal_degree
            .iter()
            .zip(members)
            .map(|(&degree, &node)| (degree, node))
            .collect();
        by_degree.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| graph.lexical_rank(a.1).cmp(&graph.lexical_rank(b.1)))
        });
        let hubs = by_degree
            .iter()
            .take(TOP_HUBS)
            .map(|&(_, node)| graph.node_id(node).to_string())
            .collect();

        Self {
            size: n,
            seed_count: registry.seed_count(),
            admitted_count: registry.admitted().len(),
            internal_edges,
            density,
            largest_component,
            hubs,
        }
    }
}

//! Memory-efficient undirected network representation

use std::collections::HashMap;
use std::mem;

/// Compressed sparse representation of an undirected gene network.
///
/// Every undirected edge is stored twice, once in each endpoint's adjacency
/// range, so `neighbors(v).len()` is the degree of `v`. Adjacency ranges are
/// sorted and free of duplicates and self-loops.
#[derive(Debug, Clone)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub(crate) node_count: usize,

    /// Offset array: offsets[i] to offsets[i+1] is the edge range of node i
    pub(crate) offsets: Vec<u32>,

    /// Edge array: concatenated sorted neighbor lists
    pub(crate) edges: Vec<u32>,

    /// Per-entry edge score, parallel to `edges` (None for unscored edges)
    pub(crate) scores: Vec<Option<f64>>,

    /// Mapping from internal node indices to gene identifiers
    pub(crate) node_ids: Vec<String>,

    /// Reverse lookup from gene identifier to node index
    pub(crate) id_to_index: HashMap<String, u32>,

    /// Position of each node when identifiers are sorted lexicographically
    pub(crate) lexical_rank: Vec<u32>,
}

impl CompressedGraph {
    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Neighbors of a node, sorted by index
    pub fn neighbors(&self, node: u32) -> &[u32] {
        let start = self.offsets[node as usize] as usize;
        let end = self.offsets[node as usize + 1] as usize;
        &self.edges[start..end]
    }

    /// Scores of the edges returned by `neighbors`, in the same order
    pub fn neighbor_scores(&self, node: u32) -> &[Option<f64>] {
        let start = self.offsets[node as usize] as usize;
        let end = self.offsets[node as usize + 1] as usize;
        &self.scores[start..end]
    }

    /// Degree of a node
    pub fn degree(&self, node: u32) -> usize {
        (self.offsets[node as usize + 1] - self.offsets[node as usize]) as usize
    }

    /// Check if there's an edge between `a` and `b`
    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Whether any edge carries a score
    pub fn is_scored(&self) -> bool {
        self.scores.iter().any(Option::is_some)
    }

    /// Index of a gene identifier
    pub fn index_of(&self, id: &str) -> Option<u32> {
        self.id_to_index.get(id).copied()
    }

    /// Gene identifier of a node index
    pub fn node_id(&self, node: u32) -> &str {
        &self.node_ids[node as usize]
    }

    /// Rank of the node's identifier in lexicographic order (0 = smallest)
    pub fn lexical_rank(&self, node: u32) -> u32 {
        self.lexical_rank[node as usize]
    }

    /// Iterate over each undirected edge once as `(a, b, score)` with `a < b`
    pub fn undirected_edges(&self) -> impl Iterator<Item = (u32, u32, Option<f64>)> + '_ {
        (0..self.node_count as u32).flat_map(move |a| {
            self.neighbors(a)
                .iter()
                .zip(self.neighbor_scores(a))
                .filter(move |&(&b, _)| a < b)
                .map(move |(&b, &score)| (a, b, score))
        })
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<u32>();
        let edges = self.edges.capacity() * mem::size_of::<u32>();
        let scores = self.scores.capacity() * mem::size_of::<Option<f64>>();
        let ranks = self.lexical_rank.capacity() * mem::size_of::<u32>();
        // ids are held twice: once in node_ids, once as map keys
        let ids = self.node_ids.iter().map(|s| s.capacity()).sum::<usize>() * 2;

        base + offsets + edges + scores + ranks + ids
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::GraphBuilder;

    #[test]
    fn undirected_edges_are_listed_once() {
        let mut builder = GraphBuilder::new();
        builder.add_edge("A", "B", Some(700.0));
        builder.add_edge("B", "C", None);
        builder.add_edge("C", "A", Some(150.0));
        let graph = builder.build().unwrap();

        let edges: Vec<_> = graph.undirected_edges().collect();
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|(a, b, _)| a < b));
        assert!(graph.is_scored());
        assert!(graph.memory_usage() > 0);
    }
}

//! Graph construction module

use std::collections::HashMap;

use crate::error::{ExpansionError, Result};
use crate::graph::CompressedGraph;

/// Builder for incrementally constructing a CompressedGraph
#[derive(Debug, Default)]
pub struct GraphBuilder {
    /// Mapping from string IDs to node indices
    id_to_index: HashMap<String, u32>,

    /// Node string IDs
    node_ids: Vec<String>,

    /// Adjacency lists for each node, both directions of every edge
    adjacency_lists: Vec<Vec<(u32, Option<f64>)>>,

    /// Self-loops seen and discarded
    self_loops: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
            self_loops: 0,
        }
    }

    /// Get or create a node index for the given gene identifier
    pub fn get_or_create_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Add an undirected edge. Self-loops register the node but add no edge.
    pub fn add_edge(&mut self, a: &str, b: &str, score: Option<f64>) {
        let a_idx = self.get_or_create_node(a);
        let b_idx = self.get_or_create_node(b);

        if a_idx == b_idx {
            self.self_loops += 1;
            return;
        }

        self.adjacency_lists[a_idx as usize].push((b_idx, score));
        self.adjacency_lists[b_idx as usize].push((a_idx, score));
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Build the compressed graph, collapsing multi-edges to the highest score
    pub fn build(mut self) -> Result<CompressedGraph> {
        let node_count = self.node_ids.len();
        if node_count == 0 {
            return Err(ExpansionError::EmptyNetwork);
        }
        if node_count > u32::MAX as usize {
            return Err(ExpansionError::InvalidParameter(format!(
                "network has {} nodes, more than a u32 index can address",
                node_count
            )));
        }
        if self.self_loops > 0 {
            log::debug!("Discarded {} self-loops", self.self_loops);
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut edges = Vec::new();
        let mut scores = Vec::new();
        offsets.push(0u32);

        let mut duplicates = 0usize;
        for list in &mut self.adjacency_lists {
            list.sort_unstable_by_key(|&(dst, _)| dst);

            let mut last: Option<u32> = None;
            for &(dst, score) in list.iter() {
                if last == Some(dst) {
                    // Same neighbor again: keep the strongest evidence
                    duplicates += 1;
                    if let Some(slot) = scores.last_mut() {
                        *slot = max_score(*slot, score);
                    }
                    continue;
                }
                edges.push(dst);
                scores.push(score);
                last = Some(dst);
            }
            offsets.push(edges.len() as u32);
        }

        if duplicates > 0 {
            log::debug!("Collapsed {} duplicate edge entries", duplicates / 2);
        }

        let mut order: Vec<u32> = (0..node_count as u32).collect();
        order.sort_unstable_by(|&a, &b| self.node_ids[a as usize].cmp(&self.node_ids[b as usize]));
        let mut lexical_rank = vec![0u32; node_count];
        for (rank, &node) in order.iter().enumerate() {
            lexical_rank[node as usize] = rank as u32;
        }

        Ok(CompressedGraph {
            node_count,
            offsets,
            edges,
            scores,
            node_ids: self.node_ids,
            id_to_index: self.id_to_index,
            lexical_rank,
        })
    }
}

fn max_score(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_loops_and_multi_edges_do_not_inflate_degree() {
        let mut builder = GraphBuilder::new();
        builder.add_edge("A", "B", Some(300.0));
        builder.add_edge("B", "A", Some(900.0));
        builder.add_edge("A", "A", None);
        builder.add_edge("A", "C", None);
        let graph = builder.build().unwrap();

        let a = graph.index_of("A").unwrap();
        let b = graph.index_of("B").unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(a), 2);
        assert_eq!(graph.degree(b), 1);
        assert!(graph.has_edge(a, b));
        assert!(!graph.has_edge(a, a));
        assert_eq!(graph.neighbor_scores(b), &[Some(900.0)]);
    }

    #[test]
    fn isolated_self_loop_node_is_kept() {
        let mut builder = GraphBuilder::new();
        builder.add_edge("X", "X", None);
        let graph = builder.build().unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.degree(0), 0);
    }

    #[test]
    fn lexical_rank_follows_identifier_order() {
        let mut builder = GraphBuilder::with_capacity(3);
        builder.add_edge("TP53", "BRCA1", None);
        builder.add_edge("MDM2", "TP53", None);
        let graph = builder.build().unwrap();

        let rank = |id: &str| graph.lexical_rank(graph.index_of(id).unwrap());
        assert_eq!(rank("BRCA1"), 0);
        assert_eq!(rank("MDM2"), 1);
        assert_eq!(rank("TP53"), 2);
    }

    #[test]
    fn empty_builder_is_an_empty_network() {
        assert!(matches!(
            GraphBuilder::new().build(),
            Err(ExpansionError::EmptyNetwork)
        ));
    }
}

//! Network preprocessing applied once before expansion

use crate::error::{ExpansionError, Result};
use crate::graph::{CompressedGraph, GraphBuilder};

/// Keep only edges scored at or above `min_score`.
///
/// Unscored edges are kept. Nodes left without any edge are dropped, so the
/// result is the sub-network induced by the retained edges.
pub fn filter_by_score(graph: &CompressedGraph, min_score: f64) -> Result<CompressedGraph> {
    let mut builder = GraphBuilder::with_capacity(graph.node_count());
    let mut kept = 0usize;
    let mut dropped = 0usize;

    for (a, b, score) in graph.undirected_edges() {
        let passes = score.map_or(true, |s| s >= min_score);
        if passes {
            builder.add_edge(graph.node_id(a), graph.node_id(b), score);
            kept += 1;
        } else {
            dropped += 1;
        }
    }

    log::info!(
        "Score filter >= {}: kept {} edges, dropped {}",
        min_score,
        kept,
        dropped
    );

    if builder.node_count() == 0 {
        return Err(ExpansionError::EmptyNetwork);
    }

    builder.build()
}

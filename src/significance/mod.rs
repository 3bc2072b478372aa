//! Connectivity significance of candidates relative to the module

pub mod engine;
pub mod hypergeom;

pub use engine::{EngineStats, SignificanceEngine};
pub use hypergeom::LogFactorials;

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Significance of one candidate against the current module
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub node: u32,

    /// Natural log of the connectivity p-value
    pub ln_p: f64,

    /// Module neighbors, seed links counted `alpha` times (k_s)
    pub weighted_links: u64,

    /// Raw network degree (k)
    pub degree: u32,

    /// Identifier order, for the final tie-break
    pub lexical_rank: u32,
}

impl CandidateScore {
    pub fn p_value(&self) -> f64 {
        self.ln_p.exp()
    }

    /// Selection order: lower p, then higher k_s, then higher degree, then
    /// lexicographically smaller identifier. `Less` means selected first.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(self.ln_p)
            .cmp(&OrderedFloat(other.ln_p))
            .then_with(|| other.weighted_links.cmp(&self.weighted_links))
            .then_with(|| other.degree.cmp(&self.degree))
            .then_with(|| self.lexical_rank.cmp(&other.lexical_rank))
    }
}

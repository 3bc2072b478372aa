//! Configuration management for seed module expansion

use serde::{Deserialize, Serialize};

use crate::error::{ExpansionError, Result};

/// Seeds used when no seed file is supplied
pub const DEFAULT_SEEDS: [&str; 3] = ["ENO1", "PGK1", "HK2"];

/// Default number of genes to admit
pub const DEFAULT_NUM_NODES: usize = 200;

/// Default minimum STRING `combined_score` for an edge to be kept
pub const DEFAULT_SCORE_THRESHOLD: f64 = 400.0;

/// How candidate significance is kept up to date between admissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStrategy {
    /// Recompute only the neighbors of each admitted node (priority queue)
    Incremental,

    /// Recount connectivity and p-values for every candidate each iteration
    FullRecompute,
}

/// What to do with requested seeds that are absent from the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Drop unknown seeds, report them in the result and the log
    WarnAndDrop,

    /// Fail with `UnknownSeed` if any seed is missing
    Strict,
}

/// Parameters of an expansion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Number of genes to admit
    pub num_nodes: usize,

    /// Weight of edges into the initial seed set (>= 1)
    pub alpha: u32,

    /// Minimum edge score kept before expansion, if any
    pub score_threshold: Option<f64>,

    /// Significance update path
    pub strategy: UpdateStrategy,

    /// Unknown seed handling
    pub seed_policy: SeedPolicy,

    /// Affected-candidate count above which p-values are evaluated with rayon
    pub parallel_threshold: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            num_nodes: DEFAULT_NUM_NODES,
            alpha: 1,
            score_threshold: None,
            strategy: UpdateStrategy::Incremental,
            seed_policy: SeedPolicy::WarnAndDrop,
            parallel_threshold: 512,
        }
    }
}

impl ExpansionConfig {
    /// Create a new configuration with custom values
    pub fn new(num_nodes: usize, alpha: u32) -> Self {
        Self {
            num_nodes,
            alpha,
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_seed_policy(mut self, seed_policy: SeedPolicy) -> Self {
        self.seed_policy = seed_policy;
        self
    }

    /// Reject parameter combinations the significance model cannot use
    pub fn validate(&self) -> Result<()> {
        if self.alpha < 1 {
            return Err(ExpansionError::InvalidParameter(format!(
                "alpha must be >= 1, got {}",
                self.alpha
            )));
        }
        if let Some(threshold) = self.score_threshold {
            if !threshold.is_finite() {
                return Err(ExpansionError::InvalidParameter(format!(
                    "score threshold must be finite, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ExpansionConfig::default();
        assert_eq!(config.num_nodes, 200);
        assert_eq!(config.alpha, 1);
        assert_eq!(config.strategy, UpdateStrategy::Incremental);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_alpha_is_rejected() {
        let config = ExpansionConfig::new(10, 0);
        assert!(matches!(
            config.validate(),
            Err(ExpansionError::InvalidParameter(_))
        ));
    }
}

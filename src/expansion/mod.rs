//! Greedy module expansion

pub mod driver;

pub use driver::{expand, ExpansionDriver};

use serde::{Deserialize, Serialize};

use crate::module::ModuleMetrics;

/// Lifecycle of a driver. Initialization happens inside
/// [`ExpansionDriver::new`], so a constructed driver is always running or done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionState {
    Running,
    Done,
}

/// Why an expansion stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The requested number of genes was admitted
    TargetReached,

    /// No remaining candidate has a link into the module. Not an error.
    CandidatesExhausted,

    /// Stopped between iterations on request
    Cancelled,
}

/// One admitted gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admission {
    /// 1-based admission rank
    pub rank: usize,
    pub gene: String,

    /// p-value that won the round
    pub p_value: f64,
    pub ln_p: f64,

    /// Weighted module links (k_s) at admission
    pub weighted_links: u64,
    pub degree: u32,
}

/// Outcome of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionResult {
    /// Admitted genes in admission order, seeds excluded
    pub admissions: Vec<Admission>,

    /// Seeds found in the network
    pub seeds_used: Vec<String>,

    /// Requested seeds absent from the network
    pub dropped_seeds: Vec<String>,

    pub termination: Termination,

    /// Connectivity of the final module
    pub module: ModuleMetrics,
}

impl ExpansionResult {
    /// Admitted gene identifiers in admission order
    pub fn genes(&self) -> Vec<&str> {
        self.admissions.iter().map(|a| a.gene.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.admissions.is_empty()
    }
}

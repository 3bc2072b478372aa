//! Seed-based disease module expansion over gene interaction networks
//!
//! Starting from a few seed genes, the module grows one gene per iteration:
//! the candidate whose links into the module are most significant under a
//! hypergeometric random-wiring model is admitted, and only the neighbors of
//! the admitted gene are re-scored.

pub mod config;
pub mod data;
pub mod error;
pub mod expansion;
pub mod graph;
pub mod module;
pub mod significance;
pub mod storage;

pub use config::{ExpansionConfig, SeedPolicy, UpdateStrategy};
pub use error::{ExpansionError, Result};
pub use expansion::{expand, Admission, ExpansionDriver, ExpansionResult, Termination};
pub use graph::{CompressedGraph, GraphBuilder};

//! Error types for seed module expansion

use thiserror::Error;

/// Errors raised while loading inputs or running an expansion
#[derive(Debug, Error)]
pub enum ExpansionError {
    /// A network or seed row could not be interpreted
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    /// The network has no nodes (possibly after score filtering)
    #[error("network is empty after loading and filtering")]
    EmptyNetwork,

    /// Requested seeds that are not present in the network
    #[error("seed genes not found in network: {}", seeds.join(", "))]
    UnknownSeed { seeds: Vec<String> },

    /// A node was admitted to the module twice
    #[error("node already in module: {0}")]
    Duplicate(String),

    /// A run parameter is out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for expansion operations
pub type Result<T> = std::result::Result<T, ExpansionError>;

impl ExpansionError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            reason: reason.into(),
        }
    }
}

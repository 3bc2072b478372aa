//! Input adapters for networks and seed lists

pub mod network;
pub mod preprocessing;
pub mod seeds;

pub use network::{load_network, read_network, NetworkFormat};
pub use seeds::{default_seeds, load_seeds, read_seeds};

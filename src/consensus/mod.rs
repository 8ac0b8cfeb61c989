//! Consensus module - Block structure, network parameters, and target arithmetic

mod block;
mod params;
mod target;

pub use block::*;
pub use params::*;
pub use target::*;

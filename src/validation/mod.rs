//! Validation module - Transaction structure and verification capabilities

mod script;
mod transaction;

pub use script::*;
pub use transaction::*;

//! Chain module - Block index tree, tip tracking, and transaction lookup

mod index;
mod txindex;

pub use index::*;
pub use txindex::*;

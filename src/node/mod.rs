//! Node module - Genesis block and chain bootstrap

mod genesis;

pub use genesis::*;

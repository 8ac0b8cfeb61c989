//! Kestrel (KST) Blockchain Core Library
//!
//! A proof-of-work/proof-of-stake hybrid chain core. This crate carries
//! the proof-of-stake kernel: stake modifier derivation, kernel hash
//! evaluation against a value-weighted target, the proposer's time-boxed
//! stake search, and full stake-proof validation on block acceptance.
//!
//! KST is the short form used in addresses, logos, and protocol
//! identifiers.

pub mod chain;
pub mod consensus;
pub mod crypto;
pub mod node;
pub mod stake;
pub mod validation;

/// Protocol constants - HARD-CODED, NEVER CONFIGURABLE
pub mod constants {
    use crate::validation::Amount;

    /// Premine seeding the first stakes (in base units, 8 decimal places)
    pub const PREMINE_ALLOCATION: Amount = 1_000_000 * 100_000_000; // 1M KST

    /// Number of decimal places
    pub const DECIMAL_PLACES: u8 = 8;

    /// Chain name (short form for addresses/logos)
    pub const CHAIN_NAME: &str = "KST";

    /// Full chain name
    pub const CHAIN_FULL_NAME: &str = "Kestrel";

    /// Genesis timestamp (Unix timestamp)
    pub const GENESIS_TIMESTAMP: u32 = 1756598400; // 2025-08-31

    /// Premine address (set during the genesis ceremony)
    pub const PREMINE_ADDRESS: &str = "KST7fQxrvM3NZGHW2LYcUfhLDKEUjQHZWXR";
}

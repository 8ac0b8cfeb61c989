//! Stake modifier checkpoints
//!
//! Hard-coded checksums of historical stake modifiers on the main
//! network. A modifier that disagrees with its checkpoint signals a
//! long-range modifier-grinding fork and must halt acceptance of the
//! block. Other networks carry no checkpoints.

use crate::consensus::Network;
use crate::crypto::{hash_bytes, Hash};
use std::collections::HashMap;

/// Checksum of a stake modifier, as recorded in the checkpoint table
pub fn stake_modifier_checksum(modifier: &Hash) -> u32 {
    let digest = hash_bytes(&modifier.0);
    u32::from_be_bytes([digest.0[0], digest.0[1], digest.0[2], digest.0[3]])
}

/// Static height -> checksum table, loaded once at startup and read-only
/// thereafter
#[derive(Debug, Default, Clone)]
pub struct StakeModifierCheckpoints {
    entries: HashMap<u64, u32>,
}

impl StakeModifierCheckpoints {
    /// The main-network table
    // TODO: add mainnet checkpoints once staking has produced enough history.
    pub fn mainnet() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Build a table from explicit entries
    pub fn from_entries(entries: impl IntoIterator<Item = (u64, u32)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Check a modifier checksum against the table
    ///
    /// Unconditionally true off the main network; true on main when no
    /// checkpoint covers the height.
    pub fn check(&self, network: Network, height: u64, checksum: u32) -> bool {
        if !network.is_main() {
            return true;
        }
        match self.entries.get(&height) {
            Some(expected) => *expected == checksum,
            None => true,
        }
    }
}

//! Stake input abstraction
//!
//! A stake input is "a spendable coin eligible to stake": it exposes its
//! value, a fingerprint identifying the exact coin, and the block that
//! confirmed it. The searcher and validator depend only on this contract,
//! so further variants (delegated stake) can be added without touching
//! the kernel.

use crate::chain::Position;
use crate::crypto::Hash;
use crate::validation::Amount;

/// A spendable coin eligible to stake
///
/// Constructed fresh per search round or per validated block; never
/// persisted.
pub trait StakeInput: Send + Sync + std::fmt::Debug {
    /// Value of the staked coin in base units
    fn value(&self) -> Amount;

    /// Opaque fingerprint of the exact coin, independent of its locking
    /// script. Part of the kernel hash preimage.
    fn uniqueness(&self) -> Vec<u8>;

    /// The chain position that confirmed the coin
    fn origin(&self) -> Option<Position>;
}

/// UTXO-backed stake, the one concrete variant
#[derive(Clone, Debug)]
pub struct UtxoStake {
    txid: Hash,
    output_index: u32,
    value: Amount,
    origin: Position,
}

impl UtxoStake {
    pub fn new(txid: Hash, output_index: u32, value: Amount, origin: Position) -> Self {
        Self {
            txid,
            output_index,
            value,
            origin,
        }
    }

    pub fn txid(&self) -> &Hash {
        &self.txid
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }
}

impl StakeInput for UtxoStake {
    fn value(&self) -> Amount {
        self.value
    }

    fn uniqueness(&self) -> Vec<u8> {
        // Outpoint serialization: txid bytes then output index
        let mut bytes = Vec::with_capacity(36);
        bytes.extend_from_slice(&self.txid.0);
        bytes.extend_from_slice(&self.output_index.to_le_bytes());
        bytes
    }

    fn origin(&self) -> Option<Position> {
        Some(Position::clone(&self.origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainPosition;
    use crate::crypto::hash_bytes;
    use std::sync::Arc;

    fn origin() -> Position {
        Arc::new(ChainPosition {
            height: 5,
            time: 1_000,
            bits: 0x1d00ffff,
            hash: hash_bytes(b"origin"),
            stake_modifier: Hash::zero(),
            parent: None,
        })
    }

    #[test]
    fn test_uniqueness_is_outpoint() {
        let stake = UtxoStake::new(hash_bytes(b"tx"), 3, 10_000, origin());
        let bytes = stake.uniqueness();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[..32], &hash_bytes(b"tx").0);
        assert_eq!(&bytes[32..], &3u32.to_le_bytes());
    }

    #[test]
    fn test_uniqueness_distinguishes_outputs() {
        let a = UtxoStake::new(hash_bytes(b"tx"), 0, 10_000, origin());
        let b = UtxoStake::new(hash_bytes(b"tx"), 1, 10_000, origin());
        assert_ne!(a.uniqueness(), b.uniqueness());
    }

    #[test]
    fn test_origin_exposed() {
        let stake = UtxoStake::new(hash_bytes(b"tx"), 0, 10_000, origin());
        assert_eq!(stake.origin().unwrap().height, 5);
        assert_eq!(stake.value(), 10_000);
    }
}

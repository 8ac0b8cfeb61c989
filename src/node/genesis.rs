//! Genesis block generation for the Kestrel (KST) blockchain
//!
//! Creates the immutable genesis block carrying the premine that seeds
//! the first stakes, plus the genesis chain position with the all-zero
//! stake modifier.

use crate::chain::ChainPosition;
use crate::consensus::{compute_tx_root, Block, BlockHeader};
use crate::constants::{GENESIS_TIMESTAMP, PREMINE_ADDRESS, PREMINE_ALLOCATION};
use crate::crypto::{hash_bytes, Hash};
use crate::validation::{Amount, Transaction};

/// Initial difficulty target
const GENESIS_BITS: u32 = 0x1e00ffff;

/// Genesis block version
const GENESIS_VERSION: u32 = 1;

/// Create the main-network genesis block
///
/// Reproducible byte-for-byte; called exactly once at chain
/// initialization.
pub fn create_genesis_block() -> Block {
    let premine_pubkey_hash = hash_bytes(PREMINE_ADDRESS.as_bytes());
    create_genesis_block_with_premine(premine_pubkey_hash, GENESIS_TIMESTAMP, PREMINE_ALLOCATION)
}

/// Create a genesis block granting the premine to an arbitrary key
///
/// Regtest and tests seed their stakeable coin this way.
pub fn create_genesis_block_with_premine(
    premine_pubkey_hash: Hash,
    time: u32,
    amount: Amount,
) -> Block {
    let premine_tx = Transaction::coinbase(time, amount, premine_pubkey_hash);

    let tx_hashes = vec![premine_tx.hash()];
    let tx_root = compute_tx_root(&tx_hashes);

    let header = BlockHeader::new(
        GENESIS_VERSION,
        Hash::zero(),
        tx_root,
        time,
        GENESIS_BITS,
        0,
    );

    Block::new(header, vec![premine_tx])
}

/// Build the chain position for a genesis block
///
/// Genesis has no parent and the all-zero stake modifier.
pub fn genesis_position(genesis: &Block) -> ChainPosition {
    ChainPosition {
        height: 0,
        time: genesis.header.time,
        bits: genesis.header.bits,
        hash: genesis.hash(),
        stake_modifier: Hash::zero(),
        parent: None,
    }
}

/// Genesis block statistics
#[derive(Debug)]
pub struct GenesisInfo {
    pub hash: Hash,
    pub tx_root: Hash,
    pub timestamp: u32,
    pub bits: u32,
    pub premine: Amount,
}

impl GenesisInfo {
    pub fn new() -> Self {
        let genesis = create_genesis_block();
        Self {
            hash: genesis.hash(),
            tx_root: genesis.header.tx_root,
            timestamp: genesis.header.time,
            bits: genesis.header.bits,
            premine: PREMINE_ALLOCATION,
        }
    }
}

impl Default for GenesisInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_is_deterministic() {
        assert_eq!(create_genesis_block().hash(), create_genesis_block().hash());
    }

    #[test]
    fn test_genesis_has_premine() {
        let genesis = create_genesis_block();
        assert!(!genesis.transactions.is_empty());

        let total: Amount = genesis.transactions[0].outputs.iter().map(|o| o.amount).sum();
        assert_eq!(total, PREMINE_ALLOCATION);
    }

    #[test]
    fn test_genesis_is_genesis() {
        let genesis = create_genesis_block();
        assert!(genesis.is_genesis());
        assert!(!genesis.is_proof_of_stake());
    }

    #[test]
    fn test_genesis_position_has_zero_modifier() {
        let genesis = create_genesis_block();
        let position = genesis_position(&genesis);
        assert_eq!(position.height, 0);
        assert!(position.stake_modifier.is_zero());
        assert!(position.parent.is_none());
        assert_eq!(position.hash, genesis.hash());
    }

    #[test]
    fn test_genesis_info() {
        let info = GenesisInfo::new();
        assert_eq!(info.premine, PREMINE_ALLOCATION);
        assert_eq!(info.timestamp, GENESIS_TIMESTAMP);
    }
}

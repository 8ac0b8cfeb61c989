//! Block structure for the Kestrel blockchain
//!
//! Defines the immutable block and block header structures, plus the
//! coinstake placement convention for proof-of-stake blocks.

use crate::crypto::{hash_pair, Hash};
use crate::validation::Transaction;
use serde::{Deserialize, Serialize};

/// Block header containing all metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    /// Protocol version
    pub version: u32,
    /// Hash of the previous block
    pub prev_hash: Hash,
    /// Root over all transaction hashes
    pub tx_root: Hash,
    /// Block timestamp (seconds since Unix epoch)
    pub time: u32,
    /// Difficulty target (compact representation)
    pub bits: u32,
    /// Nonce (unused by proof-of-stake blocks, kept for header layout)
    pub nonce: u64,
}

impl BlockHeader {
    pub fn new(
        version: u32,
        prev_hash: Hash,
        tx_root: Hash,
        time: u32,
        bits: u32,
        nonce: u64,
    ) -> Self {
        Self {
            version,
            prev_hash,
            tx_root,
            time,
            bits,
            nonce,
        }
    }

    /// Serialize the header for hashing
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.prev_hash.0);
        bytes.extend_from_slice(&self.tx_root.0);
        bytes.extend_from_slice(&self.time.to_le_bytes());
        bytes.extend_from_slice(&self.bits.to_le_bytes());
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes
    }

    /// Calculate the hash of this header
    pub fn hash(&self) -> Hash {
        crate::crypto::hash_bytes(&self.to_bytes())
    }
}

/// A complete block containing header and transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Block header
    pub header: BlockHeader,
    /// List of transactions in this block
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// Get the block hash
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Check if this is the genesis block
    pub fn is_genesis(&self) -> bool {
        self.header.prev_hash == Hash::zero()
    }

    /// Proof-of-stake blocks carry their coinstake as the second transaction
    pub fn is_proof_of_stake(&self) -> bool {
        self.transactions.len() >= 2 && self.transactions[1].is_coinstake()
    }

    /// The coinstake transaction, if this is a proof-of-stake block
    pub fn coinstake(&self) -> Option<&Transaction> {
        if self.is_proof_of_stake() {
            Some(&self.transactions[1])
        } else {
            None
        }
    }
}

/// Fold transaction hashes into a single root
///
/// Pairwise folding, duplicating the last entry on odd levels.
pub fn compute_tx_root(hashes: &[Hash]) -> Hash {
    if hashes.is_empty() {
        return Hash::zero();
    }
    let mut level: Vec<Hash> = hashes.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let right = pair.get(1).unwrap_or(&pair[0]);
            next.push(hash_pair(&pair[0], right));
        }
        level = next;
    }
    level[0]
}

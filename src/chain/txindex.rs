//! In-memory transaction index
//!
//! Implements the transaction-lookup capability the stake validator
//! consumes. Maps txid to the transaction plus the hash of the block
//! that confirmed it.

use crate::consensus::Block;
use crate::crypto::Hash;
use crate::validation::{Transaction, TxLookup, TxRecord};
use std::collections::HashMap;

/// Simple full-history transaction index
#[derive(Default)]
pub struct MemoryTxIndex {
    records: HashMap<Hash, TxRecord>,
}

impl MemoryTxIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every transaction of a connected block
    pub fn index_block(&mut self, block: &Block) {
        let block_hash = block.hash();
        for tx in &block.transactions {
            self.insert(tx.clone(), block_hash);
        }
    }

    /// Index a single transaction
    pub fn insert(&mut self, tx: Transaction, block_hash: Hash) {
        self.records.insert(tx.hash(), TxRecord { tx, block_hash });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TxLookup for MemoryTxIndex {
    fn lookup(&self, txid: &Hash) -> Option<TxRecord> {
        self.records.get(txid).cloned()
    }
}

//! Block index tree and tip tracking
//!
//! Positions are immutable, copy-cheap `Arc` handles into the index; the
//! kernel only ever reads them. Tip reads always observe a consistent
//! (height, hash) pair, never a torn state mid-reorg.

use crate::crypto::Hash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A node in the block-index tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainPosition {
    /// Block height (genesis = 0)
    pub height: u64,
    /// Block timestamp
    pub time: u32,
    /// Compact difficulty target of the block
    pub bits: u32,
    /// Block hash
    pub hash: Hash,
    /// Stake modifier, computed once at acceptance and never recomputed
    pub stake_modifier: Hash,
    /// Parent position (absent only for genesis)
    #[serde(skip)]
    pub parent: Option<Position>,
}

/// Shared, immutable handle to a chain position
pub type Position = Arc<ChainPosition>;

/// A stable snapshot of the canonical tip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipInfo {
    pub height: u64,
    pub hash: Hash,
}

struct IndexInner {
    by_hash: HashMap<Hash, Position>,
    tip: Position,
}

/// In-memory block index with a canonical tip pointer
///
/// Mutated only by the block-acceptance path; everything else reads.
pub struct ChainIndex {
    inner: RwLock<IndexInner>,
}

impl ChainIndex {
    /// Initialize the index from the genesis position
    pub fn new(genesis: ChainPosition) -> Self {
        let genesis = Arc::new(genesis);
        let mut by_hash = HashMap::new();
        by_hash.insert(genesis.hash, Arc::clone(&genesis));
        Self {
            inner: RwLock::new(IndexInner {
                by_hash,
                tip: genesis,
            }),
        }
    }

    /// Look up a position by block hash
    pub fn get(&self, hash: &Hash) -> Option<Position> {
        let inner = self.inner.read().expect("chain index lock poisoned");
        inner.by_hash.get(hash).cloned()
    }

    /// Current canonical tip position
    pub fn tip(&self) -> Position {
        let inner = self.inner.read().expect("chain index lock poisoned");
        Arc::clone(&inner.tip)
    }

    /// Stable (height, hash) pair of the canonical tip
    pub fn tip_info(&self) -> TipInfo {
        let inner = self.inner.read().expect("chain index lock poisoned");
        TipInfo {
            height: inner.tip.height,
            hash: inner.tip.hash,
        }
    }

    /// Current canonical tip height
    pub fn tip_height(&self) -> u64 {
        self.tip_info().height
    }

    /// Insert a position and advance the tip to it
    pub fn connect(&self, position: ChainPosition) -> Position {
        let position = Arc::new(position);
        let mut inner = self.inner.write().expect("chain index lock poisoned");
        inner.by_hash.insert(position.hash, Arc::clone(&position));
        inner.tip = Arc::clone(&position);
        position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash_bytes;

    fn genesis_position() -> ChainPosition {
        ChainPosition {
            height: 0,
            time: 1_000_000,
            bits: 0x1d00ffff,
            hash: hash_bytes(b"genesis"),
            stake_modifier: Hash::zero(),
            parent: None,
        }
    }

    fn child_of(parent: &Position, tag: &[u8]) -> ChainPosition {
        ChainPosition {
            height: parent.height + 1,
            time: parent.time + 60,
            bits: parent.bits,
            hash: hash_bytes(tag),
            stake_modifier: hash_bytes(tag),
            parent: Some(Arc::clone(parent)),
        }
    }

    #[test]
    fn test_genesis_initialization() {
        let index = ChainIndex::new(genesis_position());
        let tip = index.tip_info();
        assert_eq!(tip.height, 0);
        assert_eq!(tip.hash, hash_bytes(b"genesis"));
    }

    #[test]
    fn test_connect_advances_tip() {
        let index = ChainIndex::new(genesis_position());
        let genesis = index.tip();
        let pos = index.connect(child_of(&genesis, b"block1"));

        assert_eq!(index.tip_height(), 1);
        assert_eq!(index.tip_info().hash, pos.hash);
        assert!(index.get(&pos.hash).is_some());
        assert!(index.get(&genesis.hash).is_some());
    }

    #[test]
    fn test_parent_links() {
        let index = ChainIndex::new(genesis_position());
        let genesis = index.tip();
        let pos = index.connect(child_of(&genesis, b"block1"));

        let parent = pos.parent.as_ref().unwrap();
        assert_eq!(parent.height, pos.height - 1);
        assert_eq!(parent.hash, genesis.hash);
    }

    #[test]
    fn test_unknown_hash_is_none() {
        let index = ChainIndex::new(genesis_position());
        assert!(index.get(&hash_bytes(b"missing")).is_none());
    }
}

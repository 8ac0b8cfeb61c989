//! Time-boxed stake search
//!
//! Run only by a block proposer. Probes candidate timestamps within the
//! drift window for one that satisfies the kernel target, aborting as
//! soon as the chain tip moves so no proof is ever produced against an
//! outdated tip.

use crate::chain::{ChainIndex, Position};
use crate::consensus::ConsensusParams;
use crate::stake::{check_stake_kernel_hash, KernelProof, StakeError, StakeInput};
use std::sync::Mutex;
use tracing::debug;

/// Timestamp of the most recent search attempt against a tip height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptStamp {
    pub height: u64,
    pub time: u32,
}

/// Process-wide record of the last search round
///
/// Holds a single entry, replaced on every completed round. A
/// cooperating scheduler reads it to avoid rehashing the same tip
/// within a short window; the kernel itself enforces no retry interval.
#[derive(Debug, Default)]
pub struct RecentAttemptCache {
    last: Mutex<Option<AttemptStamp>>,
}

impl RecentAttemptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache with a fresh stamp
    pub fn record(&self, height: u64, time: u32) {
        let mut last = self.last.lock().expect("attempt cache lock poisoned");
        *last = Some(AttemptStamp { height, time });
    }

    /// The most recent stamp, if any round has completed
    pub fn last(&self) -> Option<AttemptStamp> {
        *self.last.lock().expect("attempt cache lock poisoned")
    }
}

/// Search the drift window for a valid kernel proof
///
/// Probes `time_start..max_time` one second at a time, where `max_time`
/// caps the window at both the drift constant and the network's maximum
/// future block time. Returns `Ok(Some(proof))` on the first satisfied
/// probe, `Ok(None)` when the window is exhausted or the tip changed
/// mid-search (both ordinary outcomes; the scheduler retries later), and
/// an error only for structural or maturity failures.
#[allow(clippy::too_many_arguments)]
pub fn stake(
    chain: &ChainIndex,
    parent: &Position,
    stake_input: &dyn StakeInput,
    bits: u32,
    time_start: u32,
    now: u32,
    cache: &RecentAttemptCache,
    params: &ConsensusParams,
) -> Result<Option<KernelProof>, StakeError> {
    let started_height = parent.height;

    let origin = stake_input
        .origin()
        .filter(|o| o.height >= 1)
        .ok_or(StakeError::NoOrigin)?;

    // Maturity against "now", not a fixed block time
    if !params.has_stake_min_age(now, origin.time) {
        return Err(StakeError::MinAgeViolation {
            tx_time: now,
            origin_time: origin.time,
        });
    }
    let height = parent.height + 1;
    if !params.has_stake_min_depth(height, origin.height) {
        return Err(StakeError::MinDepthViolation {
            height,
            origin_height: origin.height,
        });
    }

    let max_time = time_start
        .saturating_add(params.hash_drift)
        .min(params.max_future_time(now));

    let mut found = None;
    for try_time in time_start..max_time {
        // A competing block arrived; a proof against the old tip would
        // be worthless, so stop immediately.
        if chain.tip_height() != started_height {
            debug!(target: "staking", started_height, "tip changed mid-search, aborting round");
            cache.record(chain.tip_height(), now);
            return Ok(None);
        }

        let (met, proof) = check_stake_kernel_hash(parent, bits, stake_input, try_time, false)?;
        if met {
            found = Some(KernelProof {
                time: try_time,
                hash: proof,
            });
            break;
        }
    }

    cache.record(chain.tip_height(), now);
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainPosition;
    use crate::crypto::{hash_bytes, Hash};
    use crate::stake::UtxoStake;
    use crate::validation::Amount;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn position(height: u64, time: u32) -> Position {
        Arc::new(ChainPosition {
            height,
            time,
            bits: 0x1d00ffff,
            hash: hash_bytes(&height.to_le_bytes()),
            stake_modifier: hash_bytes(b"modifier"),
            parent: None,
        })
    }

    fn test_chain(tip_height: u64) -> ChainIndex {
        let chain = ChainIndex::new(ChainPosition {
            height: 0,
            time: 0,
            bits: 0x1d00ffff,
            hash: hash_bytes(b"genesis"),
            stake_modifier: Hash::zero(),
            parent: None,
        });
        for h in 1..=tip_height {
            let parent = chain.tip();
            chain.connect(ChainPosition {
                height: h,
                time: h as u32 * 60,
                bits: 0x1d00ffff,
                hash: hash_bytes(&h.to_le_bytes()),
                stake_modifier: hash_bytes(&h.to_le_bytes()),
                parent: Some(parent),
            });
        }
        chain
    }

    /// Stake input that counts kernel evaluations via its uniqueness calls
    #[derive(Debug)]
    struct CountingStake {
        inner: UtxoStake,
        probes: AtomicUsize,
    }

    impl StakeInput for CountingStake {
        fn value(&self) -> Amount {
            self.inner.value()
        }
        fn uniqueness(&self) -> Vec<u8> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.inner.uniqueness()
        }
        fn origin(&self) -> Option<Position> {
            self.inner.origin()
        }
    }

    fn params() -> ConsensusParams {
        ConsensusParams {
            network: crate::consensus::Network::Regtest,
            stake_min_age: 0,
            stake_min_depth: 1,
            max_future_block_time: 180,
            hash_drift: 60,
        }
    }

    #[test]
    fn test_cache_retains_single_entry() {
        let cache = RecentAttemptCache::new();
        assert!(cache.last().is_none());
        cache.record(5, 100);
        cache.record(6, 200);
        assert_eq!(cache.last(), Some(AttemptStamp { height: 6, time: 200 }));
    }

    #[test]
    fn test_impossible_target_probes_exactly_drift() {
        let chain = test_chain(10);
        let parent = chain.tip();
        let origin = position(2, 120);
        let stake_input = CountingStake {
            inner: UtxoStake::new(hash_bytes(b"coin"), 0, 10_000, origin),
            probes: AtomicUsize::new(0),
        };
        let cache = RecentAttemptCache::new();
        let p = params();

        // Zero bits expands to the zero target; nothing satisfies it
        let result = stake(&chain, &parent, &stake_input, 0, 10_000, 10_000, &cache, &p).unwrap();

        assert!(result.is_none());
        assert_eq!(stake_input.probes.load(Ordering::SeqCst), p.hash_drift as usize);
        assert_eq!(cache.last().map(|s| s.height), Some(10));
    }

    #[test]
    fn test_stale_tip_aborts_without_probing() {
        let chain = test_chain(11);
        // Parent claims height 10, but the chain has already advanced
        let parent = position(10, 600);
        let origin = position(2, 120);
        let stake_input = CountingStake {
            inner: UtxoStake::new(hash_bytes(b"coin"), 0, 10_000, origin),
            probes: AtomicUsize::new(0),
        };
        let cache = RecentAttemptCache::new();
        let p = params();

        // Trivially satisfiable target, yet staleness wins
        let result =
            stake(&chain, &parent, &stake_input, 0x207fffff, 10_000, 10_000, &cache, &p).unwrap();

        assert!(result.is_none());
        assert_eq!(stake_input.probes.load(Ordering::SeqCst), 0);
        assert_eq!(cache.last().map(|s| s.height), Some(11));
    }

    #[test]
    fn test_missing_origin_is_an_error() {
        #[derive(Debug)]
        struct Orphan;
        impl StakeInput for Orphan {
            fn value(&self) -> Amount {
                10_000
            }
            fn uniqueness(&self) -> Vec<u8> {
                vec![1, 2, 3]
            }
            fn origin(&self) -> Option<Position> {
                None
            }
        }

        let chain = test_chain(10);
        let parent = chain.tip();
        let cache = RecentAttemptCache::new();

        let err = stake(&chain, &parent, &Orphan, 0x1d00ffff, 10_000, 10_000, &cache, &params())
            .unwrap_err();
        assert_eq!(err, StakeError::NoOrigin);
    }

    #[test]
    fn test_genesis_origin_is_rejected() {
        let chain = test_chain(10);
        let parent = chain.tip();
        // Height-0 origins are never stakeable
        let stake_input = UtxoStake::new(hash_bytes(b"coin"), 0, 10_000, position(0, 0));
        let cache = RecentAttemptCache::new();

        let err = stake(&chain, &parent, &stake_input, 0x1d00ffff, 10_000, 10_000, &cache, &params())
            .unwrap_err();
        assert_eq!(err, StakeError::NoOrigin);
    }

    #[test]
    fn test_immature_stake_is_an_error() {
        let chain = test_chain(10);
        let parent = chain.tip();
        let origin = position(2, 120);
        let stake_input = UtxoStake::new(hash_bytes(b"coin"), 0, 10_000, origin);
        let cache = RecentAttemptCache::new();
        let mut p = params();
        p.stake_min_age = 3600;

        // now is only 880 seconds after the origin block
        let err =
            stake(&chain, &parent, &stake_input, 0x1d00ffff, 1_000, 1_000, &cache, &p).unwrap_err();
        assert!(matches!(err, StakeError::MinAgeViolation { .. }));
    }
}

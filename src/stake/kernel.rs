//! Kernel hash evaluation and stake-proof validation
//!
//! The kernel hash commits to the parent's stake modifier, the staked
//! coin's origin time and fingerprint, and the candidate time. Its byte
//! layout and field widths are consensus-critical: two conforming nodes
//! must accept and reject identically or the chain forks.

use crate::chain::{ChainIndex, Position};
use crate::consensus::{Block, ConsensusParams, Uint256};
use crate::crypto::{hash_bytes, Hash};
use crate::stake::{StakeError, StakeInput, UtxoStake};
use crate::validation::{ScriptVerifier, TxLookup};
use tracing::trace;

/// An accepted (candidate-time, proof-hash) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelProof {
    pub time: u32,
    pub hash: Hash,
}

/// Derive the stake modifier for the block after `parent`
///
/// The modifier folds chain history into every kernel hash so a coin
/// owner cannot precompute future staking opportunities at the time the
/// coin confirms. Genesis has the all-zero modifier.
pub fn compute_stake_modifier(parent: Option<&Position>, kernel_seed: &Hash) -> Hash {
    let Some(parent) = parent else {
        return Hash::zero();
    };

    let mut data = Vec::with_capacity(64);
    data.extend_from_slice(&kernel_seed.0);
    data.extend_from_slice(&parent.stake_modifier.0);
    hash_bytes(&data)
}

/// Compute the proof-of-stake kernel hash for a candidate time
///
/// Preimage layout, in fixed order: parent stake modifier (32 bytes),
/// origin block time (u32 LE), coin uniqueness bytes, candidate time
/// (u32 LE).
pub fn get_hash_proof_of_stake(
    parent: &Position,
    stake: &dyn StakeInput,
    time_tx: u32,
    verify: bool,
) -> Result<Hash, StakeError> {
    let origin = stake.origin().ok_or(StakeError::NoOrigin)?;
    let uniqueness = stake.uniqueness();

    let mut data = Vec::with_capacity(32 + 4 + uniqueness.len() + 4);
    data.extend_from_slice(&parent.stake_modifier.0);
    data.extend_from_slice(&origin.time.to_le_bytes());
    data.extend_from_slice(&uniqueness);
    data.extend_from_slice(&time_tx.to_le_bytes());

    if verify {
        trace!(
            target: "staking",
            stake_modifier = %parent.stake_modifier,
            "kernel hash preimage"
        );
    }

    Ok(hash_bytes(&data))
}

/// Check the kernel hash against the value-weighted target
///
/// The base target expands from `bits`; integer division of the stake
/// value by 100 gives the weight, and the sub-100-unit remainder is
/// deliberately discarded. The check succeeds iff the kernel hash,
/// read as an unsigned big-endian 256-bit integer, is strictly below
/// `base_target * weight`.
pub fn check_stake_kernel_hash(
    parent: &Position,
    bits: u32,
    stake: &dyn StakeInput,
    time_tx: u32,
    verify: bool,
) -> Result<(bool, Hash), StakeError> {
    let proof = get_hash_proof_of_stake(parent, stake, time_tx, verify)?;

    let value = stake.value();
    let weight = (value / 100).max(0) as u64;
    let target = Uint256::from_compact(bits).mul_u64(weight);

    let met = Uint256::from_hash(&proof) < target;

    if verify || met {
        trace!(
            target: "staking",
            uniqueness = %hex::encode(stake.uniqueness()),
            time_tx,
            proof = %proof,
            bits,
            value,
            weight,
            %target,
            met,
            "proof-of-stake kernel check"
        );
    }

    Ok((met, proof))
}

/// Reconstruct the stake input a coinstake transaction spends
///
/// Looks up the referenced previous transaction, verifies the spending
/// signature against the previous output's lock, and resolves the
/// origin position.
fn reconstruct_stake_input(
    block: &Block,
    chain: &ChainIndex,
    txs: &dyn TxLookup,
    scripts: &dyn ScriptVerifier,
) -> Result<UtxoStake, StakeError> {
    let coinstake = block.coinstake().ok_or(StakeError::NotCoinstake)?;

    // Kernel input is always input 0
    let txin = &coinstake.inputs[0];

    let record = txs
        .lookup(&txin.prev_tx_hash)
        .ok_or(StakeError::OriginLookupFailed)?;
    let prev_out = record
        .tx
        .outputs
        .get(txin.output_index as usize)
        .ok_or(StakeError::OriginLookupFailed)?;

    if !scripts.verify_spend(coinstake, 0, prev_out) {
        return Err(StakeError::SignatureInvalid);
    }

    let origin = chain
        .get(&record.block_hash)
        .ok_or(StakeError::OriginIndexMissing)?;

    Ok(UtxoStake::new(
        txin.prev_tx_hash,
        txin.output_index,
        prev_out.amount,
        origin,
    ))
}

/// Validate a block's stake proof during acceptance
///
/// Strict-order checks, short-circuiting on the first failure:
/// reconstruct the stake input, maturity (depth then age), then the
/// kernel check with the audit trace enabled. Returns the proof hash
/// and the reconstructed stake input.
pub fn check_proof_of_stake(
    block: &Block,
    chain: &ChainIndex,
    txs: &dyn TxLookup,
    scripts: &dyn ScriptVerifier,
    params: &ConsensusParams,
) -> Result<(Hash, Box<dyn StakeInput>), StakeError> {
    let stake = reconstruct_stake_input(block, chain, txs, scripts)?;

    let parent = chain
        .get(&block.header.prev_hash)
        .ok_or(StakeError::ParentNotFound)?;
    let origin = stake.origin().ok_or(StakeError::OriginIndexMissing)?;

    let height = parent.height + 1;
    if !params.has_stake_min_depth(height, origin.height) {
        return Err(StakeError::MinDepthViolation {
            height,
            origin_height: origin.height,
        });
    }

    if !params.has_stake_min_age(block.header.time, origin.time) {
        return Err(StakeError::MinAgeViolation {
            tx_time: block.header.time,
            origin_time: origin.time,
        });
    }

    let (met, proof) = check_stake_kernel_hash(&parent, block.header.bits, &stake, block.header.time, true)?;
    if !met {
        return Err(StakeError::KernelTargetNotMet);
    }

    Ok((proof, Box::new(stake)))
}

/// Coinstake timestamp protocol: block time and transaction time must
/// match exactly, unlike the drift tolerance applied elsewhere
pub fn check_coinstake_timestamp(block_time: u32, tx_time: u32) -> bool {
    block_time == tx_time
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainPosition;
    use std::sync::Arc;

    fn position(height: u64, time: u32, modifier: Hash) -> Position {
        Arc::new(ChainPosition {
            height,
            time,
            bits: 0x1d00ffff,
            hash: hash_bytes(&height.to_le_bytes()),
            stake_modifier: modifier,
            parent: None,
        })
    }

    fn stake_at(origin: Position, value: i64) -> UtxoStake {
        UtxoStake::new(hash_bytes(b"coin"), 0, value, origin)
    }

    #[test]
    fn test_genesis_modifier_is_zero() {
        assert_eq!(
            compute_stake_modifier(None, &hash_bytes(b"anything")),
            Hash::zero()
        );
    }

    #[test]
    fn test_modifier_chains_from_parent() {
        let parent_a = position(1, 100, hash_bytes(b"mod-a"));
        let parent_b = position(1, 100, hash_bytes(b"mod-b"));
        let seed = hash_bytes(b"seed");

        let mod_a = compute_stake_modifier(Some(&parent_a), &seed);
        let mod_b = compute_stake_modifier(Some(&parent_b), &seed);

        assert_ne!(mod_a, Hash::zero());
        // A different parent modifier gives a different next modifier
        assert_ne!(mod_a, mod_b);
        // And a different seed does too
        assert_ne!(mod_a, compute_stake_modifier(Some(&parent_a), &hash_bytes(b"other")));
    }

    #[test]
    fn test_kernel_hash_deterministic() {
        let parent = position(10, 5_000, hash_bytes(b"modifier"));
        let stake = stake_at(position(2, 1_000, Hash::zero()), 10_000);

        let h1 = get_hash_proof_of_stake(&parent, &stake, 6_000, false).unwrap();
        let h2 = get_hash_proof_of_stake(&parent, &stake, 6_000, true).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_kernel_hash_varies_with_time() {
        let parent = position(10, 5_000, hash_bytes(b"modifier"));
        let stake = stake_at(position(2, 1_000, Hash::zero()), 10_000);

        let h1 = get_hash_proof_of_stake(&parent, &stake, 6_000, false).unwrap();
        let h2 = get_hash_proof_of_stake(&parent, &stake, 6_001, false).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_zero_weight_never_meets_target() {
        let parent = position(10, 5_000, hash_bytes(b"modifier"));
        // Value below 100 units truncates to zero weight
        let stake = stake_at(position(2, 1_000, Hash::zero()), 99);

        let (met, _) = check_stake_kernel_hash(&parent, 0x207fffff, &stake, 6_000, false).unwrap();
        assert!(!met);
    }

    #[test]
    fn test_zero_bits_never_meets_target() {
        let parent = position(10, 5_000, hash_bytes(b"modifier"));
        let stake = stake_at(position(2, 1_000, Hash::zero()), 1_000_000);

        let (met, _) = check_stake_kernel_hash(&parent, 0, &stake, 6_000, false).unwrap();
        assert!(!met);
    }

    #[test]
    fn test_coinstake_timestamp_strict_equality() {
        assert!(check_coinstake_timestamp(1_000, 1_000));
        assert!(!check_coinstake_timestamp(1_000, 1_001));
        assert!(!check_coinstake_timestamp(1_001, 1_000));
    }
}

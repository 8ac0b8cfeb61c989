//! Proof-of-stake kernel
//!
//! Stake modifier derivation, kernel hash evaluation against the
//! value-weighted target, the proposer's time-boxed search, and full
//! stake-proof validation on the block-acceptance path.

mod checkpoints;
mod input;
mod kernel;
mod search;

pub use checkpoints::*;
pub use input::*;
pub use kernel::*;
pub use search::*;

use thiserror::Error;

/// Stake validation and search failures
///
/// Expected negative outcomes are not represented here: a kernel hash
/// that misses the target during search, tip staleness, and window
/// exhaustion are ordinary return values, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakeError {
    #[error("block does not carry a coinstake transaction")]
    NotCoinstake,
    #[error("previous transaction for coinstake input not found")]
    OriginLookupFailed,
    #[error("coinstake signature verification failed")]
    SignatureInvalid,
    #[error("block index entry for stake origin not found")]
    OriginIndexMissing,
    #[error("stake input has no usable origin block")]
    NoOrigin,
    #[error("previous block not found in chain index")]
    ParentNotFound,
    #[error("min depth violation: height={height}, origin height={origin_height}")]
    MinDepthViolation { height: u64, origin_height: u64 },
    #[error("min age violation: tx time={tx_time}, origin time={origin_time}")]
    MinAgeViolation { tx_time: u32, origin_time: u32 },
    #[error("kernel hash does not meet the weighted target")]
    KernelTargetNotMet,
}

//! Consensus parameters per network
//!
//! Maturity rules and timing bounds consumed by the proof-of-stake kernel.
//! These values are part of the protocol; only the network selection is a
//! runtime choice.

use serde::{Deserialize, Serialize};

/// Network identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    Main,
    Testnet,
    Regtest,
}

impl Network {
    /// Stake modifier checkpoints only bind on the main network
    pub fn is_main(&self) -> bool {
        matches!(self, Network::Main)
    }
}

/// Chain consensus parameters
#[derive(Clone, Debug)]
pub struct ConsensusParams {
    pub network: Network,
    /// Minimum age of a staked coin in seconds
    pub stake_min_age: u32,
    /// Minimum confirmations of a staked coin
    pub stake_min_depth: u64,
    /// How far into the future a proof-of-stake block time may lie
    pub max_future_block_time: u32,
    /// Seconds of future timestamps a proposer probes in one search round
    pub hash_drift: u32,
}

impl ConsensusParams {
    pub fn main() -> Self {
        Self {
            network: Network::Main,
            stake_min_age: 3600,
            stake_min_depth: 100,
            max_future_block_time: 180,
            hash_drift: 60,
        }
    }

    pub fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            stake_min_age: 60,
            stake_min_depth: 10,
            max_future_block_time: 180,
            hash_drift: 60,
        }
    }

    pub fn regtest() -> Self {
        Self {
            network: Network::Regtest,
            stake_min_age: 0,
            stake_min_depth: 1,
            max_future_block_time: 180,
            hash_drift: 60,
        }
    }

    /// Minimum-depth rule: the staked coin must have enough confirmations
    /// at the candidate height
    pub fn has_stake_min_depth(&self, height: u64, origin_height: u64) -> bool {
        height >= origin_height.saturating_add(self.stake_min_depth)
    }

    /// Minimum-age rule: the staked coin's origin block must be old enough
    /// relative to the spending time
    pub fn has_stake_min_age(&self, tx_time: u32, origin_time: u32) -> bool {
        u64::from(tx_time) >= u64::from(origin_time) + u64::from(self.stake_min_age)
    }

    /// Latest acceptable block time, relative to adjusted wall-clock time
    pub fn max_future_time(&self, now: u32) -> u32 {
        now.saturating_add(self.max_future_block_time)
    }
}

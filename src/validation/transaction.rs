//! Transaction structure
//!
//! UTXO-based transactions with Schnorr ownership proofs. Transactions
//! carry their own timestamp: the coinstake timestamp protocol requires
//! the staking transaction's time to equal its block's time exactly.

use crate::crypto::{hash_bytes, Hash, PublicKey, SchnorrSignature};
use serde::{Deserialize, Serialize};

/// Coin amount in base units. Signed, so stake weight arithmetic and fee
/// deltas never wrap silently.
pub type Amount = i64;

/// Output index marking a null (coinbase-style) input
pub const NULL_OUTPUT_INDEX: u32 = 0xFFFF_FFFF;

/// A transaction input referencing a previous output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxInput {
    /// Hash of the transaction containing the output
    pub prev_tx_hash: Hash,
    /// Index of the output in that transaction
    pub output_index: u32,
    /// Signature proving ownership
    pub signature: SchnorrSignature,
    /// Public key of the signer
    pub public_key: PublicKey,
}

impl TxInput {
    /// Null inputs anchor coinbase transactions; they reference nothing
    pub fn is_null(&self) -> bool {
        self.prev_tx_hash == Hash::zero() && self.output_index == NULL_OUTPUT_INDEX
    }
}

/// A transaction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutput {
    /// Amount in base units
    pub amount: Amount,
    /// Public key hash of the recipient (locking condition)
    pub pubkey_hash: Hash,
}

impl TxOutput {
    /// The empty marker output that opens every coinstake
    pub fn empty() -> Self {
        Self {
            amount: 0,
            pubkey_hash: Hash::zero(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0 && self.pubkey_hash == Hash::zero()
    }
}

/// A complete transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction version
    pub version: u32,
    /// Transaction timestamp (seconds since Unix epoch)
    pub time: u32,
    /// Transaction inputs
    pub inputs: Vec<TxInput>,
    /// Transaction outputs
    pub outputs: Vec<TxOutput>,
    /// Lock time (block height or timestamp)
    pub lock_time: u32,
}

impl Transaction {
    pub fn new(time: u32, inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            version: 1,
            time,
            inputs,
            outputs,
            lock_time: 0,
        }
    }

    /// Create a coinbase transaction (block subsidy)
    pub fn coinbase(time: u32, reward: Amount, recipient_pubkey_hash: Hash) -> Self {
        Self {
            version: 1,
            time,
            inputs: vec![TxInput {
                prev_tx_hash: Hash::zero(),
                output_index: NULL_OUTPUT_INDEX,
                signature: SchnorrSignature([0u8; 64]),
                public_key: PublicKey([0u8; 32]),
            }],
            outputs: vec![TxOutput {
                amount: reward,
                pubkey_hash: recipient_pubkey_hash,
            }],
            lock_time: 0,
        }
    }

    /// Check if this is a coinbase transaction
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_null()
    }

    /// Check if this is a coinstake transaction
    ///
    /// A coinstake spends a real previous output and opens its outputs
    /// with an empty marker, followed by the staked value.
    pub fn is_coinstake(&self) -> bool {
        !self.inputs.is_empty()
            && !self.inputs[0].is_null()
            && self.outputs.len() >= 2
            && self.outputs[0].is_empty()
    }

    /// Calculate transaction hash
    pub fn hash(&self) -> Hash {
        hash_bytes(&self.to_bytes_for_signing())
    }

    /// Get the signing hash (excludes signatures and public keys)
    pub fn signing_hash(&self) -> Hash {
        hash_bytes(&self.to_bytes_for_signing())
    }

    /// Serialize for signing (without witness data)
    fn to_bytes_for_signing(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.time.to_le_bytes());

        bytes.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            bytes.extend_from_slice(&input.prev_tx_hash.0);
            bytes.extend_from_slice(&input.output_index.to_le_bytes());
        }

        bytes.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            bytes.extend_from_slice(&output.amount.to_le_bytes());
            bytes.extend_from_slice(&output.pubkey_hash.0);
        }

        bytes.extend_from_slice(&self.lock_time.to_le_bytes());

        bytes
    }

    /// Calculate total output value
    pub fn total_output_value(&self) -> Amount {
        self.outputs.iter().map(|o| o.amount).sum()
    }
}

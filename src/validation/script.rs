//! Script-verification and transaction-lookup capabilities
//!
//! The proof-of-stake validator consumes these as abstract contracts: it
//! never reads the transaction index or checks signatures itself. The
//! Schnorr implementation below is the chain's standard spending rule
//! (output locks to BLAKE3 of an x-only public key).

use crate::crypto::{hash_bytes, Hash};
use crate::validation::{Transaction, TxOutput};

/// A transaction found in the index, with the block that confirmed it
#[derive(Debug, Clone)]
pub struct TxRecord {
    pub tx: Transaction,
    pub block_hash: Hash,
}

/// Transaction-lookup capability
pub trait TxLookup {
    /// Return the transaction and its confirming block, or None if unknown
    fn lookup(&self, txid: &Hash) -> Option<TxRecord>;
}

/// Script-verification capability
pub trait ScriptVerifier {
    /// Verify that `tx`'s input at `input_index` satisfies the locking
    /// condition of `prev_out`
    fn verify_spend(&self, tx: &Transaction, input_index: usize, prev_out: &TxOutput) -> bool;
}

/// Standard Schnorr spending rule
#[derive(Debug, Default, Clone, Copy)]
pub struct SchnorrScriptVerifier;

impl ScriptVerifier for SchnorrScriptVerifier {
    fn verify_spend(&self, tx: &Transaction, input_index: usize, prev_out: &TxOutput) -> bool {
        let Some(input) = tx.inputs.get(input_index) else {
            return false;
        };

        // The revealed key must hash to the locking condition
        if hash_bytes(&input.public_key.0) != prev_out.pubkey_hash {
            return false;
        }

        input.public_key.verify(&tx.signing_hash(), &input.signature)
    }
}

//! Kestrel (KST) Blockchain Node
//!
//! Runs a regtest staking node: bootstraps a chain from genesis, then
//! drives the proof-of-stake searcher each scheduler tick and connects
//! every block it successfully proves.

use kst_core::chain::{ChainIndex, ChainPosition, MemoryTxIndex};
use kst_core::consensus::{compute_tx_root, Block, BlockHeader, ConsensusParams};
use kst_core::constants::PREMINE_ALLOCATION;
use kst_core::crypto::{hash_bytes, Hash, PrivateKey};
use kst_core::node::{create_genesis_block_with_premine, genesis_position};
use kst_core::stake::{
    check_coinstake_timestamp, check_proof_of_stake, compute_stake_modifier,
    stake, stake_modifier_checksum, RecentAttemptCache, StakeModifierCheckpoints, UtxoStake,
};
use kst_core::validation::{
    Amount, SchnorrScriptVerifier, Transaction, TxInput, TxOutput,
};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Regtest staking difficulty: easy enough that the premine finds a
/// proof within a few drift windows
const STAKE_BITS: u32 = 0x1b7fffff;

/// The output the node is currently staking
struct StakePot {
    txid: Hash,
    output_index: u32,
    value: Amount,
    origin_block: Hash,
}

fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

/// Derive the next position for a connected block and advance the tip
fn connect_block(
    chain: &ChainIndex,
    txindex: &mut MemoryTxIndex,
    checkpoints: &StakeModifierCheckpoints,
    params: &ConsensusParams,
    block: &Block,
    modifier_seed: &Hash,
) -> Option<()> {
    let parent = chain.tip();
    let modifier = compute_stake_modifier(Some(&parent), modifier_seed);

    let height = parent.height + 1;
    let checksum = stake_modifier_checksum(&modifier);
    if !checkpoints.check(params.network, height, checksum) {
        warn!(height, checksum, "stake modifier conflicts with checkpoint, rejecting block");
        return None;
    }

    chain.connect(ChainPosition {
        height,
        time: block.header.time,
        bits: block.header.bits,
        hash: block.hash(),
        stake_modifier: modifier,
        parent: Some(parent),
    });
    txindex.index_block(block);
    Some(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let params = ConsensusParams::regtest();
    let checkpoints = StakeModifierCheckpoints::mainnet();
    let verifier = SchnorrScriptVerifier;

    // Proposer key; the regtest genesis grants it the premine
    let key = PrivateKey::generate();
    let pubkey = key.public_key();
    let pubkey_hash = hash_bytes(&pubkey.0);

    let genesis_time = unix_now().saturating_sub(60);
    let genesis = create_genesis_block_with_premine(pubkey_hash, genesis_time, PREMINE_ALLOCATION);
    let chain = Arc::new(ChainIndex::new(genesis_position(&genesis)));
    let mut txindex = MemoryTxIndex::new();
    txindex.index_block(&genesis);

    info!(
        genesis = %genesis.hash(),
        premine = PREMINE_ALLOCATION,
        "Kestrel regtest node starting up"
    );

    // Height-0 coins cannot stake, so move the premine once at height 1
    let mut bootstrap = Transaction::new(
        genesis_time + 30,
        vec![TxInput {
            prev_tx_hash: genesis.transactions[0].hash(),
            output_index: 0,
            signature: kst_core::crypto::SchnorrSignature([0u8; 64]),
            public_key: pubkey.clone(),
        }],
        vec![TxOutput {
            amount: PREMINE_ALLOCATION,
            pubkey_hash,
        }],
    );
    bootstrap.inputs[0].signature = key.sign(&bootstrap.signing_hash());

    let bootstrap_txs = vec![
        Transaction::coinbase(genesis_time + 30, 0, pubkey_hash),
        bootstrap.clone(),
    ];
    let bootstrap_root = compute_tx_root(&bootstrap_txs.iter().map(|t| t.hash()).collect::<Vec<_>>());
    let bootstrap_block = Block::new(
        BlockHeader::new(
            1,
            genesis.hash(),
            bootstrap_root,
            genesis_time + 30,
            STAKE_BITS,
            0,
        ),
        bootstrap_txs,
    );
    let bootstrap_hash = bootstrap_block.hash();
    connect_block(
        &chain,
        &mut txindex,
        &checkpoints,
        &params,
        &bootstrap_block,
        &bootstrap_hash,
    )
    .ok_or("bootstrap block rejected")?;

    let mut pot = StakePot {
        txid: bootstrap.hash(),
        output_index: 0,
        value: PREMINE_ALLOCATION,
        origin_block: bootstrap_hash,
    };

    let cache = RecentAttemptCache::new();
    info!(tip = chain.tip_height(), "staking scheduler started");

    loop {
        tokio::select! {
            _ = sleep(Duration::from_secs(1)) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received, stopping node");
                break;
            }
        }

        let now = unix_now();
        let tip = chain.tip_info();

        // Throttle: one search round per tip per second
        if let Some(stamp) = cache.last() {
            if stamp.height == tip.height && stamp.time >= now {
                continue;
            }
        }

        let parent = chain.tip();
        let Some(origin) = chain.get(&pot.origin_block) else {
            warn!(origin = %pot.origin_block, "stake origin missing from index");
            continue;
        };
        let stake_input = UtxoStake::new(pot.txid, pot.output_index, pot.value, origin);

        let proof = match stake(
            &chain,
            &parent,
            &stake_input,
            STAKE_BITS,
            now,
            now,
            &cache,
            &params,
        ) {
            Ok(Some(proof)) => proof,
            Ok(None) => continue, // no proof this round, retry next tick
            Err(err) => {
                warn!(%err, "stake search failed");
                continue;
            }
        };

        // Assemble the proof-of-stake block: empty coinbase, then the
        // coinstake spending the pot back to our own key
        let mut coinstake = Transaction::new(
            proof.time,
            vec![TxInput {
                prev_tx_hash: pot.txid,
                output_index: pot.output_index,
                signature: kst_core::crypto::SchnorrSignature([0u8; 64]),
                public_key: pubkey.clone(),
            }],
            vec![
                TxOutput::empty(),
                TxOutput {
                    amount: pot.value,
                    pubkey_hash,
                },
            ],
        );
        coinstake.inputs[0].signature = key.sign(&coinstake.signing_hash());

        let transactions = vec![
            Transaction::coinbase(proof.time, 0, pubkey_hash),
            coinstake.clone(),
        ];
        let tx_root = compute_tx_root(&transactions.iter().map(|t| t.hash()).collect::<Vec<_>>());
        let block = Block::new(
            BlockHeader::new(1, parent.hash, tx_root, proof.time, STAKE_BITS, 0),
            transactions,
        );

        if !check_coinstake_timestamp(block.header.time, coinstake.time) {
            warn!("coinstake timestamp does not match block time, discarding");
            continue;
        }

        // Run the full acceptance-path validation before connecting
        match check_proof_of_stake(&block, &chain, &txindex, &verifier, &params) {
            Ok((proof_hash, _stake)) => {
                debug_assert_eq!(proof_hash, proof.hash);
                if connect_block(&chain, &mut txindex, &checkpoints, &params, &block, &proof.hash)
                    .is_none()
                {
                    continue;
                }
                pot = StakePot {
                    txid: coinstake.hash(),
                    output_index: 1,
                    value: pot.value,
                    origin_block: block.hash(),
                };
                info!(
                    height = chain.tip_height(),
                    block = %block.hash(),
                    time = proof.time,
                    proof = %proof.hash,
                    "staked block connected"
                );
            }
            Err(err) => {
                warn!(%err, block = %block.hash(), "self-produced stake proof rejected");
            }
        }
    }

    Ok(())
}

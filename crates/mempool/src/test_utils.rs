//! Fixture builders shared by unit and integration tests.
//!
//! Enabled with the `test-utils` feature.

use crate::adapters::InMemoryChainState;
use crate::domain::MempoolConfig;
use crate::ports::outbound::ScriptVerifier;
use crate::service::PackageAdmissionService;
use script_verification::{sign_input, Keypair};
use shared_types::{
    Amount, Coin, MutableTransaction, OutPoint, PubKeyHash, Script, Transaction, TxIn, TxOut,
    Txid,
};
use std::sync::Arc;

/// Service over an in-memory chain at height 200 that accepts every script.
pub type TestService = PackageAdmissionService<InMemoryChainState, AcceptAllVerifier>;

/// Verifier that accepts every input.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllVerifier;

impl ScriptVerifier for AcceptAllVerifier {
    fn verify_script(&self, _tx: &Transaction, _input_index: usize, _spent: &TxOut) -> bool {
        true
    }
}

/// Verifier that rejects every input.
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectAllVerifier;

impl ScriptVerifier for RejectAllVerifier {
    fn verify_script(&self, _tx: &Transaction, _input_index: usize, _spent: &TxOut) -> bool {
        false
    }
}

/// Deterministic keypair; `seed` must be non-zero.
pub fn test_keypair(seed: u8) -> Keypair {
    Keypair::from_secret_bytes(&[seed; 32]).expect("non-zero seed is a valid scalar")
}

pub fn random_outpoint() -> OutPoint {
    OutPoint::new(Txid(rand::random()), 0)
}

/// Standard output to a random key hash.
pub fn random_output(value: Amount) -> TxOut {
    TxOut::new(value, Script::new_p2pkh(&PubKeyHash(rand::random())))
}

/// Adds a confirmed, non-coinbase coin at height 1 and returns its outpoint.
pub fn fund(chain: &InMemoryChainState, value: Amount) -> OutPoint {
    let outpoint = random_outpoint();
    chain.add_coin(
        outpoint,
        Coin {
            output: random_output(value),
            height: 1,
            is_coinbase: false,
        },
    );
    outpoint
}

/// Adds a coinbase coin created at `height`.
pub fn fund_coinbase(chain: &InMemoryChainState, value: Amount, height: u64) -> OutPoint {
    let outpoint = random_outpoint();
    chain.add_coin(
        outpoint,
        Coin {
            output: random_output(value),
            height,
            is_coinbase: true,
        },
    );
    outpoint
}

/// Adds a confirmed coin locked to `script_pubkey`.
pub fn fund_script(
    chain: &InMemoryChainState,
    value: Amount,
    script_pubkey: Script,
) -> (OutPoint, TxOut) {
    let outpoint = random_outpoint();
    let output = TxOut::new(value, script_pubkey);
    chain.add_coin(
        outpoint,
        Coin {
            output: output.clone(),
            height: 1,
            is_coinbase: false,
        },
    );
    (outpoint, output)
}

/// Unsigned transaction spending `prevouts` into random standard outputs.
/// Pair with [`AcceptAllVerifier`].
pub fn spend(prevouts: &[OutPoint], values: &[Amount]) -> Arc<Transaction> {
    Arc::new(Transaction::new(MutableTransaction {
        inputs: prevouts.iter().copied().map(TxIn::new).collect(),
        outputs: values.iter().copied().map(random_output).collect(),
        ..Default::default()
    }))
}

/// Single-input transaction spending `spent` at `prevout`, signed by `key`.
pub fn signed_spend(
    key: &Keypair,
    prevout: OutPoint,
    spent: &TxOut,
    values: &[Amount],
) -> Arc<Transaction> {
    let outputs = values.iter().copied().map(random_output).collect();
    signed_spend_to(key, prevout, spent, outputs)
}

/// Like [`signed_spend`], paying to the given outputs.
pub fn signed_spend_to(
    key: &Keypair,
    prevout: OutPoint,
    spent: &TxOut,
    outputs: Vec<TxOut>,
) -> Arc<Transaction> {
    let mut data = MutableTransaction {
        inputs: vec![TxIn::new(prevout)],
        outputs,
        ..Default::default()
    };
    sign_input(&mut data, 0, spent, key).expect("key-hash outputs are signable");
    Arc::new(Transaction::new(data))
}

/// Transaction of roughly `vsize` virtual bytes spending `prevout`, with
/// `value` spread over small outputs.
pub fn oversized(prevout: OutPoint, value: Amount, vsize: usize) -> Arc<Transaction> {
    // A P2PKH output encodes to 34 bytes.
    let count = vsize / 34 + 1;
    let each = value / count as Amount;
    spend(&[prevout], &vec![each; count])
}

/// Chain at height 200 plus a service over it with [`MempoolConfig::for_testing`].
pub fn test_service() -> (Arc<InMemoryChainState>, TestService) {
    test_service_with(MempoolConfig::for_testing())
}

pub fn test_service_with(config: MempoolConfig) -> (Arc<InMemoryChainState>, TestService) {
    let chain = Arc::new(InMemoryChainState::new(200));
    let service = PackageAdmissionService::new(config, chain.clone(), Arc::new(AcceptAllVerifier));
    (chain, service)
}

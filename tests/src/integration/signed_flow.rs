//! # Signed Transaction Flow
//!
//! End-to-end admission with real ECDSA signatures checked by the standard
//! script verifier:
//!
//! ```text
//! wallet key ──sign──→ Transaction ──→ PackageAdmissionService
//!                                          │
//!                                          ├─ StandardVerifierAdapter (P2PKH / P2WPKH)
//!                                          └─ InMemoryChainState (confirmed coins)
//! ```

#[cfg(test)]
mod tests {
    use mempool::test_utils::{fund_script, signed_spend, signed_spend_to, test_keypair};
    use mempool::{
        InMemoryChainState, MempoolConfig, PackageAdmissionApi, PackageAdmissionService,
        PeerPenalty, ResultKind, StandardVerifierAdapter,
    };
    use script_verification::sign_input;
    use shared_types::{MutableTransaction, Transaction, TxIn, TxOut, COIN};
    use std::sync::Arc;

    type SignedService = PackageAdmissionService<InMemoryChainState, StandardVerifierAdapter>;

    fn signed_service() -> (Arc<InMemoryChainState>, SignedService) {
        let chain = Arc::new(InMemoryChainState::new(200));
        let service = PackageAdmissionService::new(
            MempoolConfig::for_testing(),
            chain.clone(),
            Arc::new(StandardVerifierAdapter::default()),
        );
        (chain, service)
    }

    #[test]
    fn test_signed_key_hash_spend_admitted() {
        let (chain, service) = signed_service();
        let key = test_keypair(1);
        let (outpoint, spent) = fund_script(&chain, COIN, key.p2pkh_script());
        let tx = signed_spend(&key, outpoint, &spent, &[COIN - 10_000]);

        let result = service.accept_transaction(tx.clone(), false).unwrap();

        assert!(result.is_valid());
        assert!(service.contains(&tx.txid()));
    }

    #[test]
    fn test_signed_witness_spend_admitted() {
        let (chain, service) = signed_service();
        let key = test_keypair(2);
        let (outpoint, spent) = fund_script(&chain, COIN, key.p2wpkh_script());
        let tx = signed_spend(&key, outpoint, &spent, &[COIN - 10_000]);
        assert!(tx.has_witness());
        assert!(tx.vsize() < tx.total_size());

        let result = service.accept_transaction(tx.clone(), false).unwrap();

        assert!(result.get(&tx.wtxid()).unwrap().is_valid());
        assert!(service.contains(&tx.txid()));
    }

    #[test]
    fn test_tampered_output_is_a_consensus_violation() {
        let (chain, service) = signed_service();
        let key = test_keypair(3);
        let (outpoint, spent) = fund_script(&chain, COIN, key.p2pkh_script());
        let mut data = MutableTransaction {
            inputs: vec![TxIn::new(outpoint)],
            outputs: vec![TxOut::new(COIN - 10_000, test_keypair(4).p2pkh_script())],
            ..Default::default()
        };
        sign_input(&mut data, 0, &spent, &key).unwrap();
        data.outputs[0].value -= 1_000;
        let tx = Arc::new(Transaction::new(data));

        let result = service.accept_transaction(tx.clone(), false).unwrap();
        let verdict = result.get(&tx.wtxid()).unwrap();

        assert_eq!(
            verdict.reject_reason(),
            Some("mandatory-script-verify-flag-failed")
        );
        let kind = verdict.result_kind().unwrap();
        assert_eq!(kind, ResultKind::ConsensusViolation);
        assert!(!kind.is_retryable());
        assert_eq!(kind.peer_penalty(), PeerPenalty::Disconnect);
        assert_eq!(service.pool_size(), 0);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let (chain, service) = signed_service();
        let owner = test_keypair(5);
        let thief = test_keypair(6);
        let (outpoint, spent) = fund_script(&chain, COIN, owner.p2wpkh_script());
        let tx = signed_spend(&thief, outpoint, &spent, &[COIN - 10_000]);

        let result = service.accept_transaction(tx.clone(), true).unwrap();

        assert_eq!(
            result.get(&tx.wtxid()).unwrap().reject_reason(),
            Some("mandatory-script-verify-flag-failed")
        );
    }

    #[test]
    fn test_signed_parent_and_child_package() {
        let (chain, service) = signed_service();
        let alice = test_keypair(7);
        let bob = test_keypair(8);
        let (outpoint, spent) = fund_script(&chain, COIN, alice.p2pkh_script());

        let to_bob = TxOut::new(COIN - 10_000, bob.p2wpkh_script());
        let parent = signed_spend_to(&alice, outpoint, &spent, vec![to_bob.clone()]);
        let child = signed_spend(&bob, parent.outpoint(0), &to_bob, &[COIN - 30_000]);

        let result = service
            .process_package(vec![parent.clone(), child.clone()], false)
            .unwrap();

        assert!(result.is_valid());
        assert_eq!(service.pool_size(), 2);
        assert_eq!(service.status().total_fees, 30_000);
    }

    #[test]
    fn test_confirmed_parent_becomes_known() {
        let (chain, service) = signed_service();
        let alice = test_keypair(9);
        let bob = test_keypair(10);
        let (outpoint, spent) = fund_script(&chain, COIN, alice.p2pkh_script());
        let to_bob = TxOut::new(COIN - 10_000, bob.p2pkh_script());
        let parent = signed_spend_to(&alice, outpoint, &spent, vec![to_bob.clone()]);
        let child = signed_spend(&bob, parent.outpoint(0), &to_bob, &[COIN - 30_000]);
        service
            .process_package(vec![parent.clone(), child.clone()], false)
            .unwrap();

        chain.connect_transaction(&parent, 201);
        chain.set_tip_height(201);
        assert!(service.remove_for_block(&[parent.clone()]).is_empty());

        assert!(service.contains(&child.txid()));
        let again = service.accept_transaction(parent.clone(), true).unwrap();
        assert_eq!(
            again.get(&parent.wtxid()).unwrap().reject_reason(),
            Some("txn-already-known")
        );
    }
}

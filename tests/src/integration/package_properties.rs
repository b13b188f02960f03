//! # Package Admission Properties
//!
//! The observable guarantees of a `process_package` call:
//!
//! | Scenario | Expected |
//! |----------|----------|
//! | 26 members | `package-too-many-transactions`, no member results |
//! | Members over 101,000 vB in total | `package-too-large`, no member results |
//! | Valid parent and child | `AllValid`, both members valid |
//! | One member over the standard weight | `transaction failed`, member reports `tx-size` |
//! | Dry run repeated | Identical results, pool unchanged |
//! | Commit with one bad member | Nothing admitted, good members still reported valid |

#[cfg(test)]
mod tests {
    use mempool::test_utils::{fund, oversized, spend, test_service};
    use mempool::{
        PackageAdmissionApi, PackageVerdict, RejectReason, ResultKind, ValidationMode,
    };
    use shared_types::{Transaction, CENT, COIN};
    use std::sync::Arc;

    // =============================================================================
    // SANITIZER
    // =============================================================================

    #[test]
    fn test_twenty_six_transactions_rejected_before_validation() {
        let (chain, service) = test_service();
        let package: Vec<Arc<Transaction>> = (0..26)
            .map(|_| spend(&[fund(&chain, CENT)], &[CENT - 10_000]))
            .collect();

        let result = service.process_package(package, false).unwrap();

        assert_eq!(
            result.verdict,
            PackageVerdict::invalid(RejectReason::PackageTooManyTransactions)
        );
        assert_eq!(result.verdict.result_kind(), Some(ResultKind::PolicyViolation));
        assert!(result.tx_results.is_empty());
        assert_eq!(service.pool_size(), 0);
    }

    #[test]
    fn test_twenty_five_transactions_allowed() {
        let (chain, service) = test_service();
        let package: Vec<Arc<Transaction>> = (0..25)
            .map(|_| spend(&[fund(&chain, CENT)], &[CENT - 10_000]))
            .collect();

        let result = service.process_package(package, true).unwrap();

        assert!(result.is_valid());
        assert_eq!(result.tx_results.len(), 25);
    }

    #[test]
    fn test_package_over_size_limit_rejected() {
        let (chain, service) = test_service();
        // Each member is standard on its own; together they exceed 101,000 vB.
        let a = oversized(fund(&chain, COIN), COIN - 100_000, 55_000);
        let b = oversized(fund(&chain, COIN), COIN - 100_000, 55_000);
        assert!(a.vsize() + b.vsize() > 101_000);

        let result = service.process_package(vec![a, b], true).unwrap();

        assert_eq!(
            result.verdict,
            PackageVerdict::invalid(RejectReason::PackageTooLarge)
        );
        assert!(result.tx_results.is_empty());
    }

    // =============================================================================
    // VALIDATION AND COMMIT
    // =============================================================================

    #[test]
    fn test_parent_and_child_all_valid() {
        let (chain, service) = test_service();
        let parent = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
        let child = spend(&[parent.outpoint(0)], &[CENT - 20_000]);

        let result = service
            .process_package(vec![parent.clone(), child.clone()], false)
            .unwrap();

        assert_eq!(result.verdict, PackageVerdict::AllValid);
        assert!(result.get(&parent.wtxid()).unwrap().is_valid());
        assert!(result.get(&child.wtxid()).unwrap().is_valid());
        assert!(service.contains(&parent.txid()));
        assert!(service.contains(&child.txid()));
    }

    #[test]
    fn test_oversized_single_transaction_fails_with_tx_size() {
        let (chain, service) = test_service();
        let big = oversized(fund(&chain, COIN), COIN - 200_000, 101_000);
        assert!(big.vsize() > 101_000);

        let result = service.accept_transaction(big.clone(), true).unwrap();

        assert_eq!(
            result.verdict,
            PackageVerdict::Invalid {
                reason: RejectReason::TransactionFailed,
                kind: ResultKind::TransactionRejected,
            }
        );
        assert_eq!(result.verdict.reject_reason(), Some("transaction failed"));
        assert_eq!(
            result.get(&big.wtxid()).unwrap().reject_reason(),
            Some("tx-size")
        );
        assert_eq!(service.pool_size(), 0);
    }

    #[test]
    fn test_repeated_dry_run_is_identical_and_pure() {
        let (chain, service) = test_service();
        let parent = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
        let child = spend(&[parent.outpoint(0)], &[CENT - 20_000]);
        let package = vec![parent, child];
        let before = service.status();

        let first = service.admit(&package, ValidationMode::DryRun).unwrap();
        let second = service.admit(&package, ValidationMode::DryRun).unwrap();

        assert!(first.is_valid());
        assert_eq!(first, second);
        assert_eq!(service.status(), before);
    }

    #[test]
    fn test_dry_run_matches_commit_decision() {
        let (chain, service) = test_service();
        let good = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
        let cheap = spend(&[fund(&chain, CENT)], &[CENT - 1]);

        for package in [vec![good.clone()], vec![cheap.clone()]] {
            let dry = service.admit(&package, ValidationMode::DryRun).unwrap();
            let commit = service.admit(&package, ValidationMode::Commit).unwrap();
            assert_eq!(dry, commit);
        }
        assert!(service.contains(&good.txid()));
        assert!(!service.contains(&cheap.txid()));
    }

    #[test]
    fn test_one_bad_member_blocks_the_whole_package() {
        let (chain, service) = test_service();
        let a = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
        let b = spend(&[a.outpoint(0)], &[CENT - 20_000]);
        let c = spend(&[fund(&chain, CENT)], &[CENT + 1]);

        let result = service
            .process_package(vec![a.clone(), b.clone(), c.clone()], false)
            .unwrap();

        assert_eq!(
            result.verdict,
            PackageVerdict::Invalid {
                reason: RejectReason::TransactionFailed,
                kind: ResultKind::ConsensusViolation,
            }
        );
        assert!(result.get(&a.wtxid()).unwrap().is_valid());
        assert!(result.get(&b.wtxid()).unwrap().is_valid());
        assert_eq!(
            result.get(&c.wtxid()).unwrap().reject_reason(),
            Some("bad-txns-in-belowout")
        );
        assert_eq!(service.pool_size(), 0);
        assert_eq!(service.status().total_fees, 0);
    }

    #[test]
    fn test_results_keyed_by_witness_id_for_every_member() {
        let (chain, service) = test_service();
        let package: Vec<Arc<Transaction>> = (0..5)
            .map(|_| spend(&[fund(&chain, CENT)], &[CENT - 10_000]))
            .collect();

        let result = service.process_package(package.clone(), true).unwrap();

        assert_eq!(result.tx_results.len(), package.len());
        for tx in &package {
            assert!(result.tx_results.contains_key(&tx.wtxid()));
        }
    }

    #[test]
    fn test_child_before_parent_is_not_sorted() {
        let (chain, service) = test_service();
        let parent = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
        let child = spend(&[parent.outpoint(0)], &[CENT - 20_000]);

        let result = service.process_package(vec![child, parent], false).unwrap();

        assert_eq!(result.verdict.reject_reason(), Some("package-not-sorted"));
        assert_eq!(service.pool_size(), 0);
    }

    #[test]
    fn test_members_spending_the_same_coin_conflict() {
        let (chain, service) = test_service();
        let coin = fund(&chain, CENT);
        let first = spend(&[coin], &[CENT - 10_000]);
        let second = spend(&[coin], &[CENT - 20_000]);

        let result = service.process_package(vec![first, second], false).unwrap();

        assert_eq!(
            result.verdict,
            PackageVerdict::invalid(RejectReason::ConflictInPackage)
        );
    }

    #[test]
    fn test_resubmitting_an_admitted_package() {
        let (chain, service) = test_service();
        let tx = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
        assert!(service.accept_transaction(tx.clone(), false).unwrap().is_valid());

        let again = service.accept_transaction(tx.clone(), false).unwrap();

        assert_eq!(
            again.get(&tx.wtxid()).unwrap().reject_reason(),
            Some("txn-already-in-mempool")
        );
        assert_eq!(service.pool_size(), 1);
    }

    #[test]
    fn test_result_reports_as_json() {
        let (chain, service) = test_service();
        let good = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
        let bad = spend(&[fund(&chain, CENT)], &[CENT + 1]);

        let result = service
            .process_package(vec![good.clone(), bad.clone()], true)
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["verdict"]["result"], "invalid");
        assert_eq!(json["verdict"]["reason"], "transaction failed");
        assert_eq!(json["verdict"]["kind"], "ConsensusViolation");
        let members = &json["tx_results"];
        assert_eq!(members[good.wtxid().to_string()]["result"], "valid");
        assert_eq!(members[good.wtxid().to_string()]["fee"], 10_000);
        assert_eq!(
            members[bad.wtxid().to_string()]["reason"],
            "bad-txns-in-belowout"
        );
    }
}

//! # Pool Maintenance
//!
//! Size-limit trimming after a commit, the rolling admission floor it
//! raises, and block connection.

#[cfg(test)]
mod tests {
    use mempool::test_utils::{fund, spend, test_service, test_service_with};
    use mempool::{
        FeeRate, MempoolConfig, PackageAdmissionApi, PackageVerdict, RejectReason, ResultKind,
    };
    use shared_types::CENT;

    /// Room for one single-input, single-output transaction (85 vB).
    fn tiny_pool() -> MempoolConfig {
        MempoolConfig {
            max_pool_vsize: 100,
            ..MempoolConfig::for_testing()
        }
    }

    #[test]
    fn test_trim_evicts_lowest_rate_and_raises_floor() {
        let (chain, service) = test_service_with(tiny_pool());
        let cheap = spend(&[fund(&chain, CENT)], &[CENT - 200]);
        let rich = spend(&[fund(&chain, CENT)], &[CENT - 2_000]);
        assert_eq!(cheap.vsize(), 85);

        assert!(service.accept_transaction(cheap.clone(), false).unwrap().is_valid());
        assert_eq!(service.status().min_fee_rate, FeeRate::ZERO);
        assert!(service.accept_transaction(rich.clone(), false).unwrap().is_valid());

        assert!(!service.contains(&cheap.txid()));
        assert!(service.contains(&rich.txid()));
        // Evicted rate (200 per 85 vB) plus the incremental rate.
        assert_eq!(service.status().min_fee_rate, FeeRate::per_kvb(2_352 + 1_000));
    }

    #[test]
    fn test_raised_floor_rejects_low_fee() {
        let (chain, service) = test_service_with(tiny_pool());
        let cheap = spend(&[fund(&chain, CENT)], &[CENT - 200]);
        let rich = spend(&[fund(&chain, CENT)], &[CENT - 2_000]);
        service.accept_transaction(cheap, false).unwrap();
        service.accept_transaction(rich, false).unwrap();

        let late = spend(&[fund(&chain, CENT)], &[CENT - 200]);
        let result = service.accept_transaction(late.clone(), true).unwrap();

        assert_eq!(
            result.get(&late.wtxid()).unwrap().reject_reason(),
            Some("mempool min fee not met")
        );
    }

    #[test]
    fn test_floor_decays_after_block() {
        let (chain, service) = test_service_with(tiny_pool());
        let cheap = spend(&[fund(&chain, CENT)], &[CENT - 200]);
        let rich = spend(&[fund(&chain, CENT)], &[CENT - 2_000]);
        service.accept_transaction(cheap, false).unwrap();
        service.accept_transaction(rich.clone(), false).unwrap();

        service.remove_for_block(&[rich]);

        assert_eq!(service.status().min_fee_rate, FeeRate::per_kvb(1_676));
        let late = spend(&[fund(&chain, CENT)], &[CENT - 200]);
        assert!(service.accept_transaction(late, true).unwrap().is_valid());
    }

    #[test]
    fn test_member_lost_to_trim_is_rejected_as_mempool_full() {
        let (chain, service) = test_service_with(tiny_pool());
        let rich = spend(&[fund(&chain, CENT)], &[CENT - 2_000]);
        let cheap = spend(&[fund(&chain, CENT)], &[CENT - 200]);
        service.accept_transaction(rich.clone(), false).unwrap();
        let before = service.status();

        let result = service.accept_transaction(cheap.clone(), false).unwrap();

        assert_eq!(
            result.verdict,
            PackageVerdict::Invalid {
                reason: RejectReason::TransactionFailed,
                kind: ResultKind::TransactionRejected,
            }
        );
        assert_eq!(
            result.get(&cheap.wtxid()).unwrap().reject_reason(),
            Some("mempool full")
        );
        assert!(!service.contains(&cheap.txid()));
        assert!(service.contains(&rich.txid()));
        assert_eq!(service.status(), before);
    }

    #[test]
    fn test_dry_run_reports_the_same_trim_loss() {
        let (chain, service) = test_service_with(tiny_pool());
        let rich = spend(&[fund(&chain, CENT)], &[CENT - 2_000]);
        let cheap = spend(&[fund(&chain, CENT)], &[CENT - 200]);
        service.accept_transaction(rich.clone(), false).unwrap();
        let before = service.status();

        let dry = service.accept_transaction(cheap.clone(), true).unwrap();
        let real = service.accept_transaction(cheap.clone(), false).unwrap();

        assert_eq!(dry, real);
        assert_eq!(dry.verdict.reject_reason(), Some("transaction failed"));
        assert_eq!(service.status(), before);
        assert_eq!(service.pool_size(), 1);
    }

    #[test]
    fn test_block_confirms_parent_and_evicts_conflicts() {
        let (chain, service) = test_service();
        let parent = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
        let child = spend(&[parent.outpoint(0)], &[CENT - 20_000]);
        let contested = fund(&chain, CENT);
        let loser = spend(&[contested], &[CENT - 10_000]);
        let loser_child = spend(&[loser.outpoint(0)], &[CENT - 20_000]);
        service
            .process_package(vec![parent.clone(), child.clone()], false)
            .unwrap();
        service
            .process_package(vec![loser.clone(), loser_child.clone()], false)
            .unwrap();
        assert_eq!(service.pool_size(), 4);

        let winner = spend(&[contested], &[CENT - 5_000]);
        let mut evicted = service.remove_for_block(&[parent.clone(), winner]);
        evicted.sort();

        let mut expected = vec![loser.txid(), loser_child.txid()];
        expected.sort();
        assert_eq!(evicted, expected);
        assert_eq!(service.pool_size(), 1);
        assert!(service.contains(&child.txid()));
    }
}

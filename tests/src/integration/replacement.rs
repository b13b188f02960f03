//! # Replace-by-Fee Scenarios
//!
//! A lone transaction may evict the pool entries it conflicts with, together
//! with their descendants, when it pays strictly more. Multi-member packages
//! never replace.

#[cfg(test)]
mod tests {
    use mempool::test_utils::{fund, spend, test_service, test_service_with};
    use mempool::{MempoolConfig, PackageAdmissionApi, RejectReason};
    use shared_types::CENT;

    #[test]
    fn test_higher_fee_replaces_conflict() {
        let (chain, service) = test_service();
        let coin = fund(&chain, CENT);
        let original = spend(&[coin], &[CENT - 10_000]);
        let replacement = spend(&[coin], &[CENT - 30_000]);
        service.accept_transaction(original.clone(), false).unwrap();

        let result = service.accept_transaction(replacement.clone(), false).unwrap();

        assert!(result.is_valid());
        assert!(!service.contains(&original.txid()));
        assert!(service.contains(&replacement.txid()));
        assert_eq!(service.status().total_fees, 30_000);
    }

    #[test]
    fn test_replacement_evicts_descendants() {
        let (chain, service) = test_service();
        let coin = fund(&chain, CENT);
        let parent = spend(&[coin], &[CENT - 10_000]);
        let child = spend(&[parent.outpoint(0)], &[CENT - 20_000]);
        service
            .process_package(vec![parent.clone(), child.clone()], false)
            .unwrap();

        let replacement = spend(&[coin], &[CENT - 50_000]);
        let result = service.accept_transaction(replacement.clone(), false).unwrap();

        assert!(result.is_valid());
        assert_eq!(service.pool_size(), 1);
        assert!(!service.contains(&child.txid()));
    }

    #[test]
    fn test_lower_fee_does_not_replace() {
        let (chain, service) = test_service();
        let coin = fund(&chain, CENT);
        let original = spend(&[coin], &[CENT - 30_000]);
        let cheaper = spend(&[coin], &[CENT - 10_000]);
        service.accept_transaction(original.clone(), false).unwrap();

        let result = service.accept_transaction(cheaper.clone(), false).unwrap();

        assert_eq!(
            result.get(&cheaper.wtxid()).unwrap().reject_reason(),
            Some(RejectReason::InsufficientFee.as_str())
        );
        assert!(service.contains(&original.txid()));
    }

    #[test]
    fn test_dry_run_replacement_keeps_original() {
        let (chain, service) = test_service();
        let coin = fund(&chain, CENT);
        let original = spend(&[coin], &[CENT - 10_000]);
        let replacement = spend(&[coin], &[CENT - 30_000]);
        service.accept_transaction(original.clone(), false).unwrap();

        let result = service.accept_transaction(replacement, true).unwrap();

        assert!(result.is_valid());
        assert!(service.contains(&original.txid()));
        assert_eq!(service.pool_size(), 1);
    }

    #[test]
    fn test_package_member_cannot_replace() {
        let (chain, service) = test_service();
        let coin = fund(&chain, CENT);
        let original = spend(&[coin], &[CENT - 10_000]);
        service.accept_transaction(original.clone(), false).unwrap();

        let replacement = spend(&[coin], &[CENT - 50_000]);
        let sibling = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
        let result = service
            .process_package(vec![replacement.clone(), sibling.clone()], false)
            .unwrap();

        assert!(!result.is_valid());
        assert_eq!(
            result.get(&replacement.wtxid()).unwrap().reject_reason(),
            Some("txn-mempool-conflict")
        );
        assert!(result.get(&sibling.wtxid()).unwrap().is_valid());
        assert!(service.contains(&original.txid()));
        assert!(!service.contains(&sibling.txid()));
    }

    #[test]
    fn test_replacement_disabled() {
        let (chain, service) = test_service_with(MempoolConfig {
            enable_rbf: false,
            ..MempoolConfig::for_testing()
        });
        let coin = fund(&chain, CENT);
        let original = spend(&[coin], &[CENT - 10_000]);
        let replacement = spend(&[coin], &[CENT - 50_000]);
        service.accept_transaction(original.clone(), false).unwrap();

        let result = service.accept_transaction(replacement.clone(), false).unwrap();

        assert_eq!(
            result.get(&replacement.wtxid()).unwrap().reject_reason(),
            Some("txn-mempool-conflict")
        );
        assert!(service.contains(&original.txid()));
    }

    #[test]
    fn test_too_many_replacements() {
        let (chain, service) = test_service_with(MempoolConfig {
            max_replacements: 2,
            ..MempoolConfig::for_testing()
        });
        let coin = fund(&chain, CENT);
        let parent = spend(&[coin], &[CENT / 2, CENT / 2 - 10_000]);
        let child_a = spend(&[parent.outpoint(0)], &[CENT / 2 - 10_000]);
        let child_b = spend(&[parent.outpoint(1)], &[CENT / 2 - 20_000]);
        let admitted = service
            .process_package(vec![parent, child_a, child_b], false)
            .unwrap();
        assert!(admitted.is_valid());

        let replacement = spend(&[coin], &[CENT / 2]);
        let result = service.accept_transaction(replacement.clone(), false).unwrap();

        assert_eq!(
            result.get(&replacement.wtxid()).unwrap().reject_reason(),
            Some("too many potential replacements")
        );
        assert_eq!(service.pool_size(), 3);
    }

    #[test]
    fn test_replacement_adding_unconfirmed_input_is_rejected() {
        let (chain, service) = test_service();
        let coin = fund(&chain, CENT);
        let original = spend(&[coin], &[CENT - 10_000]);
        let unrelated = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
        service.accept_transaction(original.clone(), false).unwrap();
        service.accept_transaction(unrelated.clone(), false).unwrap();

        let replacement = spend(&[coin, unrelated.outpoint(0)], &[CENT]);
        let result = service.accept_transaction(replacement.clone(), false).unwrap();

        assert_eq!(
            result.get(&replacement.wtxid()).unwrap().reject_reason(),
            Some("replacement-adds-unconfirmed")
        );
        assert!(service.contains(&original.txid()));
        assert_eq!(service.pool_size(), 2);
    }
}

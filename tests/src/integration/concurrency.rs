//! # Concurrent Submission
//!
//! Admission passes from different threads are serialized by the pool lock:
//! conflicting submissions never both land, and independent ones all do.

#[cfg(test)]
mod tests {
    use mempool::test_utils::{fund, spend, test_service_with, AcceptAllVerifier};
    use mempool::{MempoolConfig, PackageAdmissionApi, PackageAdmissionService, SharedPool};
    use shared_types::CENT;
    use std::sync::Arc;
    use std::thread;

    const THREADS: usize = 8;

    fn no_rbf() -> MempoolConfig {
        MempoolConfig {
            enable_rbf: false,
            ..MempoolConfig::for_testing()
        }
    }

    #[test]
    fn test_conflicting_submissions_admit_exactly_one() {
        let (chain, service) = test_service_with(no_rbf());
        let coin = fund(&chain, CENT);
        let spenders: Vec<_> = (0..THREADS)
            .map(|i| spend(&[coin], &[CENT - 10_000 - i as i64 * 1_000]))
            .collect();

        let accepted = thread::scope(|scope| {
            let handles: Vec<_> = spenders
                .iter()
                .map(|tx| {
                    let service = &service;
                    scope.spawn(move || service.accept_transaction(tx.clone(), false).unwrap())
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|result| result.is_valid())
                .count()
        });

        assert_eq!(accepted, 1);
        assert_eq!(service.pool_size(), 1);
    }

    #[test]
    fn test_independent_packages_all_admitted() {
        let (chain, service) = test_service_with(no_rbf());
        let packages: Vec<_> = (0..THREADS)
            .map(|_| {
                let parent = spend(&[fund(&chain, CENT)], &[CENT - 10_000]);
                let child = spend(&[parent.outpoint(0)], &[CENT - 20_000]);
                vec![parent, child]
            })
            .collect();

        thread::scope(|scope| {
            for package in &packages {
                let service = &service;
                scope.spawn(move || {
                    let result = service.process_package(package.clone(), false).unwrap();
                    assert!(result.is_valid());
                });
            }
        });

        assert_eq!(service.pool_size(), THREADS * 2);
        assert_eq!(service.status().total_fees, THREADS as i64 * 20_000);
    }

    #[test]
    fn test_dry_runs_alongside_commits_leave_only_commits() {
        let (chain, service) = test_service_with(no_rbf());
        let committed: Vec<_> = (0..THREADS)
            .map(|_| spend(&[fund(&chain, CENT)], &[CENT - 10_000]))
            .collect();
        let probed: Vec<_> = (0..THREADS)
            .map(|_| spend(&[fund(&chain, CENT)], &[CENT - 10_000]))
            .collect();

        thread::scope(|scope| {
            for (commit, probe) in committed.iter().zip(&probed) {
                let service = &service;
                scope.spawn(move || service.accept_transaction(commit.clone(), false).unwrap());
                scope.spawn(move || service.accept_transaction(probe.clone(), true).unwrap());
            }
        });

        assert_eq!(service.pool_size(), THREADS);
        assert!(committed.iter().all(|tx| service.contains(&tx.txid())));
        assert!(probed.iter().all(|tx| !service.contains(&tx.txid())));
    }

    #[test]
    fn test_services_sharing_one_pool() {
        let (chain, first) = test_service_with(no_rbf());
        let pool: SharedPool = first.pool().clone();
        let second =
            PackageAdmissionService::with_pool(no_rbf(), pool, chain.clone(), Arc::new(AcceptAllVerifier));
        let coin = fund(&chain, CENT);

        let a = spend(&[coin], &[CENT - 10_000]);
        let b = spend(&[coin], &[CENT - 20_000]);
        assert!(first.accept_transaction(a.clone(), false).unwrap().is_valid());
        let result = second.accept_transaction(b.clone(), false).unwrap();

        assert_eq!(
            result.get(&b.wtxid()).unwrap().reject_reason(),
            Some("txn-mempool-conflict")
        );
        assert!(second.contains(&a.txid()));
    }
}

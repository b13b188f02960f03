//! # Admission Benchmarks
//!
//! | Benchmark | Measures |
//! |-----------|----------|
//! | `sanitize` | Package shape checks, no chain access |
//! | `dry_run` | Full validation of a chain of N members under the pool lock |
//! | `signed_dry_run` | One P2PKH and one P2WPKH spend with real signature checks |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mempool::test_utils::{fund, fund_script, signed_spend, spend, test_keypair, test_service};
use mempool::{
    sanitize, InMemoryChainState, MempoolConfig, PackageAdmissionService, PackageLimits,
    StandardVerifierAdapter, ValidationMode,
};
use shared_types::{Package, CENT, COIN};
use std::sync::Arc;
use std::time::Duration;

/// Chain of `len` transactions, each spending the previous one's output.
fn chain_package(chain: &InMemoryChainState, len: usize) -> Package {
    let mut prevout = fund(chain, CENT);
    let mut value = CENT;
    let mut package = Vec::with_capacity(len);
    for _ in 0..len {
        value -= 10_000;
        let tx = spend(&[prevout], &[value]);
        prevout = tx.outpoint(0);
        package.push(tx);
    }
    package
}

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");
    let chain = InMemoryChainState::new(200);
    let limits = PackageLimits::default();

    for len in [1, 10, 25] {
        let package = chain_package(&chain, len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &package, |b, package| {
            b.iter(|| black_box(sanitize(package, &limits).is_ok()))
        });
    }
    group.finish();
}

fn bench_dry_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("dry_run");
    group.measurement_time(Duration::from_secs(5));

    for len in [1, 10, 25] {
        let (chain, service) = test_service();
        let package = chain_package(&chain, len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &package, |b, package| {
            b.iter(|| {
                let result = service.admit(package, ValidationMode::DryRun);
                black_box(result.map(|r| r.is_valid()))
            })
        });
    }
    group.finish();
}

fn bench_signed_dry_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("signed_dry_run");
    let chain = Arc::new(InMemoryChainState::new(200));
    let service = PackageAdmissionService::new(
        MempoolConfig::default(),
        chain.clone(),
        Arc::new(StandardVerifierAdapter::default()),
    );
    let key = test_keypair(1);

    let (outpoint, spent) = fund_script(&chain, COIN, key.p2pkh_script());
    let legacy = vec![signed_spend(&key, outpoint, &spent, &[COIN - 10_000])];
    let (outpoint, spent) = fund_script(&chain, COIN, key.p2wpkh_script());
    let witness = vec![signed_spend(&key, outpoint, &spent, &[COIN - 10_000])];

    group.bench_function("p2pkh", |b| {
        b.iter(|| black_box(service.admit(&legacy, ValidationMode::DryRun).is_ok()))
    });
    group.bench_function("p2wpkh", |b| {
        b.iter(|| black_box(service.admit(&witness, ValidationMode::DryRun).is_ok()))
    });
    group.finish();
}

criterion_group!(benches, bench_sanitize, bench_dry_run, bench_signed_dry_run);
criterion_main!(benches);

//! Store benchmarks: update throughput, snapshot reads and reopen cost.
//!
//! Run with: cargo bench -p prefetch-storage --bench store_benchmark

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use prefetch_core::config::PredictorConfig;
use prefetch_core::types::{
    PageAggregate, PrefetchKeyType, RequestPriority, ResourceCategory, ResourceRecord,
};
use prefetch_storage::PredictorStore;
use tempfile::TempDir;

fn aggregate(key_type: PrefetchKeyType, key: &str, resources: usize, last_visit: i64) -> PageAggregate {
    let mut aggregate = PageAggregate::new(key_type, key).with_last_visit(last_visit);
    aggregate.resources = (0..resources)
        .map(|i| {
            let category = match i % 4 {
                0 => ResourceCategory::Stylesheet,
                1 => ResourceCategory::Script,
                2 => ResourceCategory::Image,
                _ => ResourceCategory::Font,
            };
            ResourceRecord::new(
                format!("{key}/r{i}"),
                category,
                (i % 7) as u32 + 1,
                (i % 3) as u32,
                0,
                (i + 1) as f64,
                RequestPriority::Medium,
                i % 2 == 0,
                false,
            )
        })
        .collect();
    aggregate
}

fn populated(dir: &TempDir, pages: usize) -> PredictorStore {
    let store = PredictorStore::open(&dir.path().join("predictor.db"), &PredictorConfig::default()).unwrap();
    for i in 0..pages {
        store
            .update_data(
                aggregate(PrefetchKeyType::Url, &format!("http://site{i}.com"), 20, i as i64),
                aggregate(PrefetchKeyType::Host, &format!("site{i}.com"), 20, i as i64),
            )
            .wait()
            .unwrap();
    }
    store
}

fn update_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_update");
    group.sample_size(20);

    for resources in [5, 25, 50] {
        let dir = TempDir::new().unwrap();
        let store = populated(&dir, 100);
        let mut visit = 1_000i64;

        group.bench_with_input(BenchmarkId::new("update_data", resources), &resources, |b, &n| {
            b.iter(|| {
                visit += 1;
                store
                    .update_data(
                        aggregate(PrefetchKeyType::Url, "http://site0.com", n, visit),
                        PageAggregate::empty(PrefetchKeyType::Host),
                    )
                    .wait()
                    .unwrap();
            });
        });
    }
    group.finish();
}

fn snapshot_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_read");
    let dir = TempDir::new().unwrap();
    let store = populated(&dir, 200);

    group.bench_function("get_all_data", |b| {
        b.iter(|| store.get_all_data().wait().unwrap());
    });
    group.bench_function("get_data", |b| {
        b.iter(|| {
            store
                .get_data("http://site42.com", PrefetchKeyType::Url)
                .wait()
                .unwrap()
        });
    });
    group.finish();
}

fn reopen(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_open");
    group.sample_size(10);

    let dir = TempDir::new().unwrap();
    populated(&dir, 200).shutdown().unwrap();
    let path = dir.path().join("predictor.db");

    group.bench_function("open_200_pages", |b| {
        b.iter(|| {
            PredictorStore::open(&path, &PredictorConfig::default())
                .unwrap()
                .shutdown()
                .unwrap()
        });
    });
    group.finish();
}

criterion_group!(benches, update_throughput, snapshot_reads, reopen);
criterion_main!(benches);

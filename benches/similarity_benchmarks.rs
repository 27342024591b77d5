use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ludograph::similarity::{
    compute_similarity_edges, sparsify, AttributeIndex, AttributeKey, EmissionGate,
    SimilarityConfig,
};

/// Synthetic catalogue: every game gets a few categories and mechanics
fn synthetic_index(games: u64) -> AttributeIndex {
    AttributeIndex::from_sets((0..games).map(|id| {
        let attrs = vec![
            AttributeKey::category(id % 17),
            AttributeKey::category(id % 5 + 20),
            AttributeKey::mechanic(id % 11),
            AttributeKey::mechanic(id % 3 + 30),
        ];
        (id, attrs)
    }))
    .unwrap()
}

/// Benchmark pairwise similarity across worker counts
fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");
    group.sample_size(10);

    let index = synthetic_index(2_000);
    for workers in [1, 2, 4, 8].iter() {
        let config = SimilarityConfig {
            gate: EmissionGate::Threshold(75.0),
            worker_count: *workers,
            progress_interval: 0,
        };
        group.bench_with_input(BenchmarkId::from_parameter(workers), workers, |b, _| {
            b.iter(|| {
                let edges = compute_similarity_edges(&index, &config).unwrap();
                criterion::black_box(edges.len());
            });
        });
    }
    group.finish();
}

/// Benchmark top-K sparsification of a dense edge list
fn bench_sparsify(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparsify");

    for size in [250u64, 500, 1_000].iter() {
        let config = SimilarityConfig {
            gate: EmissionGate::NonZero,
            worker_count: 4,
            progress_interval: 0,
        };
        let edges = compute_similarity_edges(&synthetic_index(*size), &config).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let outcome = sparsify(&edges, 0.2).unwrap();
                criterion::black_box(outcome.edges.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_similarity, bench_sparsify);
criterion_main!(benches);

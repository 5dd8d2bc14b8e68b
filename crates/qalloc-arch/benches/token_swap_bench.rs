//! Benchmarks for architecture queries and token swapping
//!
//! Run with: cargo bench -p qalloc-arch

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qalloc_arch::{
    ArchGraph, BfsPathFinder, ExhaustiveTokenSwapFinder, PathFinder, TokenSwapFinder,
};

/// Benchmark the BFS over permutation space
fn bench_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_swap_preprocess");
    group.sample_size(10);

    for n in [4u32, 5, 6, 7] {
        let graph = ArchGraph::linear(n);
        group.bench_with_input(BenchmarkId::new("linear", n), &graph, |b, g| {
            b.iter(|| ExhaustiveTokenSwapFinder::new(black_box(g)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark a single query on a preprocessed finder
fn bench_query(c: &mut Criterion) {
    let graph = ArchGraph::ibmqx4();
    let finder = ExhaustiveTokenSwapFinder::new(&graph).unwrap();
    let from = [0u32, 1, 2, 3, 4];
    let to = [4u32, 3, 2, 1, 0];

    c.bench_function("token_swap_query_qx4", |b| {
        b.iter(|| finder.find(black_box(&from), black_box(&to)).unwrap());
    });
}

/// Benchmark shortest path lookups
fn bench_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("bfs_path");

    for n in [8u32, 32, 128] {
        let graph = ArchGraph::ring(n);
        group.bench_with_input(BenchmarkId::new("ring", n), &graph, |b, g| {
            b.iter(|| BfsPathFinder.find(g, black_box(0), black_box(n / 2)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_preprocess, bench_query, bench_path);

criterion_main!(benches);

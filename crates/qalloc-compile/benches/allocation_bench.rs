//! Benchmarks for the allocation strategies
//!
//! Run with: cargo bench -p qalloc-compile

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qalloc_arch::{ArchGraph, ExhaustiveTokenSwapFinder};
use qalloc_compile::{
    CostModel, DepSolver, DependencySet, DirectSolBuilder, DynprogDepSolver, GreedyCktSolver,
    MappingFinder, PathGuidedSolBuilder, SolBuilder, WeightedMappingFinder,
};

/// A deterministic pseudo-random dependency list over `n` qubits.
fn dependencies(n: u32, count: u32) -> DependencySet {
    let mut state = 0x2545_f491_u32;
    let mut pairs = Vec::with_capacity(count as usize);
    while pairs.len() < count as usize {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let a = state % n;
        let b = (state / n) % n;
        if a != b {
            pairs.push((a, b));
        }
    }
    DependencySet::from_pairs(pairs)
}

/// Benchmark the optimal solver with a shared token swap finder
fn bench_dynprog(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynprog");
    group.sample_size(10);

    let graph = ArchGraph::ibmqx2();
    let finder = Arc::new(ExhaustiveTokenSwapFinder::new(&graph).unwrap());
    let solver = DynprogDepSolver::new(CostModel::default()).with_finder(finder);

    for count in [5u32, 10, 20] {
        let deps = dependencies(5, count);
        group.bench_with_input(BenchmarkId::new("qx2", count), &deps, |b, deps| {
            b.iter(|| solver.solve(black_box(&graph), black_box(deps)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the heuristic strategies on a larger ring
fn bench_heuristics(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristics");

    let graph = ArchGraph::ring(16);
    let deps = dependencies(16, 200);
    let costs = CostModel::default();
    let initial = WeightedMappingFinder.find(&graph, &deps).unwrap();

    group.bench_function("weighted_mapping", |b| {
        b.iter(|| WeightedMappingFinder.find(black_box(&graph), black_box(&deps)).unwrap());
    });
    group.bench_function("greedy", |b| {
        let solver = GreedyCktSolver::new(costs);
        b.iter(|| solver.solve(black_box(&graph), black_box(&deps)).unwrap());
    });
    group.bench_function("path_guided", |b| {
        let builder = PathGuidedSolBuilder::new(costs);
        b.iter(|| builder.build(black_box(&graph), black_box(&deps), &initial).unwrap());
    });

    // Direct allocation needs every pair within two hops.
    let star = ArchGraph::star(16);
    let star_initial = WeightedMappingFinder.find(&star, &deps).unwrap();
    group.bench_function("direct_star", |b| {
        let builder = DirectSolBuilder::new(costs);
        b.iter(|| builder.build(black_box(&star), black_box(&deps), &star_initial).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_dynprog, bench_heuristics);

criterion_main!(benches);

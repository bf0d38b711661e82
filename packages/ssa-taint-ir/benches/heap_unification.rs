//! Heap unification performance benchmark.
//!
//! Measures `HeapState::unify` throughput for the two shapes §4.C2's
//! union-by-size contract is supposed to keep cheap: a long chain of
//! pairwise unions (stresses path compression) and a star (one hub
//! reference unified with every other, stresses the field-map merge).
//!
//! Run with:
//! ```bash
//! cargo bench --bench heap_unification
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ssa_taint_ir::features::points_to::domain::{Context, HeapState, ReferenceFactory};
use ssa_taint_ir::ssa::ValueId;

fn chain_unify(size: u32) -> HeapState {
    let factory = ReferenceFactory::new();
    let mut heap = HeapState::new();
    let ctx = Context::empty();
    for i in 0..size {
        let a = factory.make_local(ctx.clone(), ValueId(i));
        let b = factory.make_local(ctx.clone(), ValueId(i + 1));
        heap.insert(&a);
        heap.insert(&b);
        heap.unify(&a, &b);
    }
    heap
}

fn star_unify(size: u32) -> HeapState {
    let factory = ReferenceFactory::new();
    let mut heap = HeapState::new();
    let ctx = Context::empty();
    let hub = factory.make_local(ctx.clone(), ValueId(0));
    heap.insert(&hub);
    for i in 1..size {
        let spoke = factory.make_local(ctx.clone(), ValueId(i));
        heap.insert(&spoke);
        heap.unify(&hub, &spoke);
    }
    heap
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap_unify_chain");
    for size in [64u32, 512, 4096] {
        group.bench_with_input(BenchmarkId::new("size", size), &size, |b, &size| {
            b.iter(|| black_box(chain_unify(size)));
        });
    }
    group.finish();
}

fn bench_star(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap_unify_star");
    for size in [64u32, 512, 4096] {
        group.bench_with_input(BenchmarkId::new("size", size), &size, |b, &size| {
            b.iter(|| black_box(star_unify(size)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_chain, bench_star);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tessera::arena::{AllocationStrategy, ArenaConfig, SegmentSet};

fn benchmark_segment_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("SegmentSet");

    for size in [8, 64, 256, 1024].iter() {
        group.throughput(Throughput::Bytes((*size * 100) as u64));
        group.bench_with_input(BenchmarkId::new("allocate", size), size, |b, &size| {
            b.iter(|| {
                let mut set = SegmentSet::new(ArenaConfig::default()).unwrap();
                for _ in 0..100 {
                    black_box(set.allocate(size).unwrap());
                }
                set
            });
        });
    }

    group.finish();
}

fn benchmark_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("Strategy");

    for strategy in [AllocationStrategy::FixedSize, AllocationStrategy::GrowHeuristically].iter() {
        group.bench_with_input(
            BenchmarkId::new("fill_1mb", strategy.name()),
            strategy,
            |b, &strategy| {
                let config = ArenaConfig::new(256).with_strategy(strategy);
                b.iter(|| {
                    let mut set = SegmentSet::new(config.clone()).unwrap();
                    for _ in 0..(1 << 14) {
                        black_box(set.allocate(64).unwrap());
                    }
                    set.segment_count()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_segment_allocation, benchmark_strategies);
criterion_main!(benches);

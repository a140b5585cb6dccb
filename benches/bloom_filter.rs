use amq_filters::bloom::BloomFilter;
use amq_filters::Filter;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

fn bench_insert(c: &mut Criterion) {
    let mut initial_items = 0;
    while initial_items < 1024 - 32 {
        c.bench_function(&format!("bench insert {}", initial_items), |b| {
            b.iter_batched_ref(
                || {
                    let mut filter = BloomFilter::new(1024, 0.01);
                    for key in 0..initial_items {
                        filter.insert(key);
                    }
                    filter
                },
                |filter| filter.insert(0xDEAD_BEEF),
                BatchSize::PerIteration,
            )
        });
        initial_items += 32;
    }
}

fn bench_contains(c: &mut Criterion) {
    let mut filter = BloomFilter::new(1024, 0.01);
    for key in 0..512 {
        filter.insert(key);
    }
    c.bench_function("bench contains", |b| {
        b.iter(|| (0..1024).filter(|key| filter.contains(*key)).count())
    });
}

criterion_group!(benches, bench_insert, bench_contains);
criterion_main!(benches);

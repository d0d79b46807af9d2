//! Benchmark suite for random hash set operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use randset::sync::RandomHashSet;
use std::{sync::Arc, thread, time::Duration};

/// Benchmark insertion into an empty set, growing the table along the way.
fn insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [100u64, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let set = RandomHashSet::with_seed(1);
                for i in 0..size {
                    set.insert(black_box(i));
                }
            });
        });
    }
    group.finish();
}

/// Benchmark insertion into a set that was sized up front.
fn insert_presized_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_presized");

    for size in [100u64, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let set = RandomHashSet::with_capacity(size as usize).unwrap();
                for i in 0..size {
                    set.insert(black_box(i));
                }
            });
        });
    }
    group.finish();
}

fn contains_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains");

    for size in [100u64, 1000, 10000].iter() {
        let set = (0..*size).collect::<RandomHashSet<_>>();

        group.throughput(Throughput::Elements(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                for i in 0..size {
                    let _ = set.contains(&black_box(i));
                }
            });
        });
    }
    group.finish();
}

/// Benchmark random element retrieval. The cost should not depend on the size
/// of the set.
fn random_element_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_element");

    for size in [100u64, 10000, 1000000].iter() {
        let set = RandomHashSet::with_seed(1);
        set.insert_all(0..*size);

        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                for _ in 0..1000 {
                    let _ = black_box(set.random_element());
                }
            });
        });
    }
    group.finish();
}

/// Benchmark insertion and removal cycles, which grow and shrink the table.
fn churn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    let size = 5000u64;
    group.throughput(Throughput::Elements(size * 2));
    group.bench_function("grow_and_shrink", |b| {
        let set = RandomHashSet::with_seed(1);
        b.iter(|| {
            for i in 0..size {
                set.insert(black_box(i));
            }
            for i in 0..size {
                set.remove(&black_box(i));
            }
        });
    });

    group.finish();
}

/// Benchmark inserts from several threads into disjoint ranges.
fn concurrent_insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_insert");

    let per_thread = 2500u64;
    for num_threads in [1u64, 2, 4, 8].iter() {
        group.throughput(Throughput::Elements(per_thread * num_threads));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let set = Arc::new(
                        RandomHashSet::builder()
                            .shards(num_threads as usize * 2)
                            .seed(1)
                            .build()
                            .unwrap(),
                    );
                    let handles = (0..num_threads)
                        .map(|t| {
                            let set = Arc::clone(&set);
                            thread::spawn(move || {
                                for i in t * per_thread..(t + 1) * per_thread {
                                    set.insert(i);
                                }
                            })
                        })
                        .collect::<Vec<_>>();
                    handles
                        .into_iter()
                        .for_each(|h| h.join().expect("Failed"));
                });
            },
        );
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(100);
    targets = insert_benchmark, insert_presized_benchmark, contains_benchmark,
              random_element_benchmark, churn_benchmark, concurrent_insert_benchmark
}

criterion_main!(benches);

// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::mem::size_of;

const NUM_THREADS: &[usize] = &[1, 2, 4, 8];
const LENGTHS: &[usize] = &[10_000, 100_000, 1_000_000];

fn sum_odd_squares(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum_odd_squares");
    for len in LENGTHS {
        group.throughput(Throughput::Bytes((len * size_of::<u64>()) as u64));
        group.bench_with_input(BenchmarkId::new("serial", len), len, serial::sum_odd_squares);
        group.bench_with_input(
            BenchmarkId::new("transduce", len),
            len,
            sequential::sum_odd_squares,
        );
        group.bench_with_input(
            BenchmarkId::new("generate", len),
            len,
            sequential::sum_odd_squares_lazy,
        );
        for &num_threads in NUM_THREADS {
            group.bench_with_input(
                BenchmarkId::new(format!("rayon@{num_threads}"), len),
                len,
                |bencher, len| rayon::sum_odd_squares(bencher, num_threads, len),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("transduce_parallel@{num_threads}"), len),
                len,
                |bencher, len| parallel::sum_odd_squares(bencher, num_threads, len),
            );
        }
    }
    group.finish();
}

fn batch_sums(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_sums");
    for len in LENGTHS {
        group.throughput(Throughput::Bytes((len * size_of::<u64>()) as u64));
        group.bench_with_input(BenchmarkId::new("serial", len), len, serial::batch_sums);
        group.bench_with_input(
            BenchmarkId::new("transduce", len),
            len,
            sequential::batch_sums,
        );
    }
    group.finish();
}

/// Baseline benchmarks using serial iterators.
mod serial {
    use criterion::{black_box, Bencher};

    pub fn sum_odd_squares(bencher: &mut Bencher, len: &usize) {
        let input = (0..*len as u64).collect::<Vec<u64>>();
        let input_slice = input.as_slice();
        bencher.iter(|| {
            black_box(input_slice)
                .iter()
                .filter(|&&x| x % 2 == 1)
                .map(|&x| x * x)
                .sum::<u64>()
        });
    }

    pub fn batch_sums(bencher: &mut Bencher, len: &usize) {
        let input = (0..*len as u64).collect::<Vec<u64>>();
        let input_slice = input.as_slice();
        bencher.iter(|| {
            black_box(input_slice)
                .chunks(16)
                .map(|chunk| chunk.iter().sum::<u64>())
                .collect::<Vec<u64>>()
        });
    }
}

/// Benchmarks using the sequential and lazy drivers.
mod sequential {
    use criterion::{black_box, Bencher};
    use transducer::prelude::*;

    pub fn sum_odd_squares(bencher: &mut Bencher, len: &usize) {
        let input = (0..*len as u64).collect::<Vec<u64>>();
        let input_slice = input.as_slice();
        bencher.iter(|| {
            transduce(
                compose!(
                    filtering(|x: &u64| x % 2 == 1),
                    mapping(|x: u64| x * x),
                ),
                completing(0u64, |acc: u64, x: u64| acc + x),
                black_box(input_slice).iter().copied(),
            )
        });
    }

    pub fn sum_odd_squares_lazy(bencher: &mut Bencher, len: &usize) {
        let input = (0..*len as u64).collect::<Vec<u64>>();
        let input_slice = input.as_slice();
        bencher.iter(|| {
            generate(
                compose!(
                    filtering(|x: &u64| x % 2 == 1),
                    mapping(|x: u64| x * x),
                ),
                black_box(input_slice).iter().copied(),
            )
            .sum::<u64>()
        });
    }

    pub fn batch_sums(bencher: &mut Bencher, len: &usize) {
        let input = (0..*len as u64).collect::<Vec<u64>>();
        let input_slice = input.as_slice();
        bencher.iter(|| {
            transduce(
                compose!(
                    batching(16).unwrap(),
                    mapping(|batch: Vec<u64>| batch.into_iter().sum::<u64>()),
                ),
                Appending,
                black_box(input_slice).iter().copied(),
            )
        });
    }
}

/// Benchmarks using Rayon.
mod rayon {
    use criterion::{black_box, Bencher};
    use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

    pub fn sum_odd_squares(bencher: &mut Bencher, num_threads: usize, len: &usize) {
        let input = (0..*len as u64).collect::<Vec<u64>>();
        let input_slice = input.as_slice();
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .unwrap();
        thread_pool.install(|| {
            bencher.iter(|| {
                black_box(input_slice)
                    .par_iter()
                    .filter(|&&x| x % 2 == 1)
                    .map(|&x| x * x)
                    .sum::<u64>()
            })
        });
    }
}

/// Benchmarks using the parallel driver.
mod parallel {
    use criterion::{black_box, Bencher};
    use transducer::prelude::*;

    pub fn sum_odd_squares(bencher: &mut Bencher, num_threads: usize, len: &usize) {
        let input = (0..*len as u64).collect::<Vec<u64>>();
        let input_slice = input.as_slice();
        let executor = ExecutorBuilder {
            num_threads: ThreadCount::try_from(num_threads).unwrap(),
            cpu_pinning: CpuPinningPolicy::IfSupported,
        }
        .build();
        let driver = ParallelTransduce::new(&executor)
            .with_partitioning(GeometricPartitioning::new(1024, 2).unwrap());

        bencher.iter(|| {
            driver
                .transduce(
                    compose!(
                        filtering(|x: &u64| x % 2 == 1),
                        mapping(|x: u64| x * x),
                    ),
                    completing(0u64, |acc: u64, x: u64| acc + x).combining(|a, b| a + b),
                    black_box(input_slice).iter().copied(),
                )
                .unwrap()
        });
    }
}

criterion_group!(benches, sum_odd_squares, batch_sums);
criterion_main!(benches);

// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI tool to run transducer pipelines sequentially, lazily or in parallel.

use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use std::hint::black_box;
use std::num::NonZeroUsize;
use std::process::ExitCode;
use transducer::prelude::*;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let input = random_input(cli.input_size, cli.seed);
    let executor = ExecutorBuilder {
        num_threads: match cli.num_threads {
            Some(num_threads) => ThreadCount::Count(num_threads),
            None => ThreadCount::AvailableParallelism,
        },
        cpu_pinning: CpuPinningPolicy::IfSupported,
    }
    .build();
    let driver = ParallelTransduce::new(&executor).with_partitioning(GeometricPartitioning::new(
        cli.first_partition_size,
        cli.growth_factor,
    )?);

    match (cli.scenario, cli.mode) {
        (Scenario::SumOddSquares, mode) => {
            let pipeline = || {
                compose!(
                    filtering(|x: &u64| x % 2 == 1),
                    mapping(|x: u64| x * x % 1_000_007),
                )
            };
            let sum = completing(0u64, |acc: u64, x: u64| acc + x).combining(|a, b| a + b);
            let result = match mode {
                Mode::Sequential => transduce(pipeline(), sum, black_box(input)),
                Mode::Lazy => generate(pipeline(), black_box(input)).sum(),
                Mode::Parallel => driver.transduce(pipeline(), sum, black_box(input))?,
            };
            println!("sum = {result}");
        }
        (Scenario::MovingMaximum, Mode::Parallel) => {
            // Windows depend on their neighbors, so this is rejected.
            let result = driver.transduce(
                compose!(
                    windowing(cli.window_size)?,
                    mapping(|window: Vec<u64>| window.into_iter().max()),
                ),
                Appending,
                input,
            );
            println!("result = {result:?}");
            result?;
        }
        (Scenario::MovingMaximum, mode) => {
            let pipeline = compose!(
                windowing(cli.window_size)?,
                mapping(|window: Vec<u64>| window.into_iter().max().unwrap_or_default()),
                taking(10),
            );
            let maxima: Vec<u64> = match mode {
                Mode::Lazy => generate(pipeline, black_box(input)).collect(),
                _ => transduce(pipeline, Appending, black_box(input)),
            };
            println!("first moving maxima = {maxima:?}");
        }
        (Scenario::Distinct, mode) => {
            let pipeline = || {
                compose!(
                    mapping(|x: u64| x % 1000),
                    filtering(|x: &u64| x % 7 == 0),
                )
            };
            let distinct_values = match mode {
                Mode::Sequential => transduce(pipeline(), Adding, black_box(input)),
                Mode::Lazy => generate(compose!(pipeline(), distinct()), black_box(input))
                    .collect(),
                Mode::Parallel => driver.transduce(pipeline(), Adding, black_box(input))?,
            };
            println!("found {} distinct multiples of 7", distinct_values.len());
        }
    }

    Ok(())
}

/// Creates a vector of `input_size` random numbers, from a fixed seed for
/// reproducibility.
fn random_input(input_size: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    (0..input_size).map(|_| rng.random_range(0..1 << 32)).collect()
}

/// CLI tool to run transducer pipelines.
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(version)]
struct Cli {
    /// Number of worker threads. Default to the available parallelism.
    #[arg(long)]
    num_threads: Option<NonZeroUsize>,

    /// How to run the pipeline.
    #[arg(long, value_enum)]
    mode: Mode,

    /// Scenario to run.
    #[arg(long, value_enum)]
    scenario: Scenario,

    /// Number of items in the input.
    #[arg(long, default_value_t = 1_000_000)]
    input_size: usize,

    /// Seed of the random input.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Size of the first partition, in parallel mode.
    #[arg(long, default_value_t = 1)]
    first_partition_size: usize,

    /// Growth factor of the partitions, in parallel mode.
    #[arg(long, default_value_t = 2)]
    growth_factor: usize,

    /// Window size. Used only for the moving-maximum scenario.
    #[arg(long, default_value_t = 4)]
    window_size: usize,
}

/// How to run the pipeline.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Eagerly, on the calling thread.
    Sequential,
    /// As an iterator.
    Lazy,
    /// On partitions of the input, in parallel.
    Parallel,
}

/// Scenario to run.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Scenario {
    /// Sum the squares of the odd numbers.
    SumOddSquares,
    /// Compute maxima over a sliding window.
    MovingMaximum,
    /// Collect distinct values.
    Distinct,
}

// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parallel executors, running the tasks of a parallel reduction.

#[cfg(feature = "rayon")]
mod rayon;
mod scoped;

use crate::error::{Error, Result};
use crate::macros::log_error;
#[cfg(feature = "rayon")]
pub use rayon::RayonExecutor;
pub use scoped::{CpuPinningPolicy, ExecutorBuilder, ScopedExecutor};
use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

/// An executor running a batch of independent tasks, possibly in parallel.
///
/// Implementations must uphold the following guarantees, which the parallel
/// driver relies on:
/// - the task is invoked exactly once per work item, together with the index
///   of the work item in the batch,
/// - the outputs are returned in the order of the work items, regardless of
///   the order in which the tasks ran,
/// - a panicking task doesn't abort the batch: the remaining tasks still run,
///   the outputs are discarded and
///   [`Error::WorkerPanicked`](crate::Error::WorkerPanicked) is returned for
///   the first work item (in batch order) whose task panicked.
pub trait ParallelExecutor {
    /// Runs the task on each work item and returns the outputs in order.
    fn execute<W: Send, O: Send>(
        &self,
        work: Vec<W>,
        task: impl Fn(usize, W) -> O + Sync,
    ) -> Result<Vec<O>>;
}

/// Executor running all the tasks in order on the calling thread.
///
/// Panics are still caught and reported like in the other executors.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl ParallelExecutor for Sequential {
    fn execute<W: Send, O: Send>(
        &self,
        work: Vec<W>,
        task: impl Fn(usize, W) -> O + Sync,
    ) -> Result<Vec<O>> {
        let outputs = work
            .into_iter()
            .enumerate()
            .map(|(index, item)| Mutex::new(Some(run_task(&task, index, item))))
            .collect();
        collect_outputs(outputs)
    }
}

/// Number of threads to spawn in an executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadCount {
    /// Spawn the number of threads returned by
    /// [`std::thread::available_parallelism()`].
    AvailableParallelism,
    /// Spawn the given number of threads.
    Count(NonZeroUsize),
}

impl ThreadCount {
    /// Resolves the number of threads to spawn.
    pub fn count(self) -> NonZeroUsize {
        match self {
            ThreadCount::AvailableParallelism => std::thread::available_parallelism()
                .expect("Getting the available parallelism failed"),
            ThreadCount::Count(count) => count,
        }
    }
}

impl TryFrom<usize> for ThreadCount {
    type Error = <NonZeroUsize as TryFrom<usize>>::Error;

    fn try_from(thread_count: usize) -> std::result::Result<Self, Self::Error> {
        let count = NonZeroUsize::try_from(thread_count)?;
        Ok(ThreadCount::Count(count))
    }
}

/// Output slot of a task: empty until the task has run.
type TaskOutput<O> = Mutex<Option<std::thread::Result<O>>>;

/// Runs a single task, catching any panic.
fn run_task<W, O>(
    task: &impl Fn(usize, W) -> O,
    index: usize,
    item: W,
) -> std::thread::Result<O> {
    catch_unwind(AssertUnwindSafe(|| task(index, item)))
}

/// Gathers the task outputs in order, reporting the first panic.
fn collect_outputs<O>(outputs: Vec<TaskOutput<O>>) -> Result<Vec<O>> {
    outputs
        .into_iter()
        .enumerate()
        .map(|(index, output)| {
            match output.into_inner().unwrap_or_else(PoisonError::into_inner) {
                Some(Ok(output)) => Ok(output),
                Some(Err(payload)) => {
                    let error = Error::from_panic(index, payload.as_ref());
                    log_error!("{error}");
                    Err(error)
                }
                None => unreachable!("Task #{index} was never run"),
            }
        })
        .collect()
}

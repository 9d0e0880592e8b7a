// Copyright 2025-2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Adaptor over Rayon thread pools.

use super::{collect_outputs, run_task, ParallelExecutor, TaskOutput};
use crate::error::Result;
use crate::macros::log_debug;
use rayon_core::{Scope, ThreadPool};
use std::sync::{Mutex, PoisonError};

/// Adaptor to run the tasks of a parallel reduction on a thread pool provided
/// by the [Rayon](https://docs.rs/rayon) crate.
///
/// Each batch of tasks runs in its own Rayon scope, with one job spawned per
/// task.
///
/// ```
/// # // TODO: Enable Miri once supported by Rayon and its dependencies: https://github.com/crossbeam-rs/crossbeam/issues/1181.
/// # #[cfg(not(miri))]
/// # {
/// # use transducer::prelude::*;
/// let executor = RayonExecutor::new_global();
///
/// let result = transduce_parallel(&executor, mapping(|x: u32| x * 2), Appending, 0..10)?;
/// assert_eq!(result, [0, 2, 4, 6, 8, 10, 12, 14, 16, 18]);
/// # }
/// # Ok::<(), transducer::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RayonExecutor<'a> {
    /// Handle to the Rayon thread pool, or [`None`] if using the global Rayon
    /// thread pool.
    thread_pool: Option<&'a ThreadPool>,
}

impl RayonExecutor<'static> {
    /// Wraps [Rayon](https://docs.rs/rayon)'s global thread pool.
    pub fn new_global() -> Self {
        Self { thread_pool: None }
    }
}

impl<'a> RayonExecutor<'a> {
    /// Wraps a user-created [Rayon](https://docs.rs/rayon) thread pool.
    ///
    /// ```
    /// # // TODO: Enable Miri once supported by Rayon and its dependencies: https://github.com/crossbeam-rs/crossbeam/issues/1181.
    /// # #[cfg(not(miri))]
    /// # {
    /// # use transducer::prelude::*;
    /// let thread_pool = rayon_core::ThreadPoolBuilder::new()
    ///     .num_threads(2)
    ///     .build()
    ///     .unwrap();
    /// let executor = RayonExecutor::new(&thread_pool);
    ///
    /// let result = transduce_parallel(&executor, filtering(|x: &u32| x % 3 == 0), Appending, 0..10)?;
    /// assert_eq!(result, [0, 3, 6, 9]);
    /// # }
    /// # Ok::<(), transducer::Error>(())
    /// ```
    pub fn new(thread_pool: &'a ThreadPool) -> Self {
        Self {
            thread_pool: Some(thread_pool),
        }
    }

    /// Creates a fork-join scope on the underlying Rayon thread pool and
    /// invokes the closure with a reference to the scope.
    fn scope<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&Scope<'scope>) -> R + Send,
        R: Send,
    {
        match self.thread_pool {
            None => rayon_core::scope(op),
            Some(thread_pool) => thread_pool.scope(op),
        }
    }
}

impl ParallelExecutor for RayonExecutor<'_> {
    fn execute<W: Send, O: Send>(
        &self,
        work: Vec<W>,
        task: impl Fn(usize, W) -> O + Sync,
    ) -> Result<Vec<O>> {
        let outputs: Vec<TaskOutput<O>> = work.iter().map(|_| Mutex::new(None)).collect();
        let _num_tasks = outputs.len();

        let outputs_ref = &outputs;
        let task = &task;
        self.scope(move |scope| {
            for (index, item) in work.into_iter().enumerate() {
                scope.spawn(move |_| {
                    let output = run_task(task, index, item);
                    *outputs_ref[index]
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner) = Some(output);
                });
            }
        });
        log_debug!("[main thread] Rayon scope completed {_num_tasks} tasks");

        collect_outputs(outputs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // TODO: Enable Miri once supported by Rayon and its dependencies: https://github.com/crossbeam-rs/crossbeam/issues/1181.
    #[cfg(not(miri))]
    #[test]
    fn test_custom_thread_pool() {
        let thread_pool = rayon_core::ThreadPoolBuilder::new()
            .num_threads(3)
            .build()
            .unwrap();
        let executor = RayonExecutor::new(&thread_pool);
        let outputs = executor.execute((0..10).collect(), |index, x: usize| {
            assert!(rayon_core::current_thread_index().is_some());
            index + x
        });
        assert_eq!(outputs, Ok((0..10).map(|x| 2 * x).collect()));
    }

    // TODO: Enable Miri once supported by Rayon and its dependencies: https://github.com/crossbeam-rs/crossbeam/issues/1181.
    #[cfg(not(miri))]
    #[test]
    fn test_nested_execution() {
        let executor = RayonExecutor::new_global();
        let outputs = executor.execute(vec![vec![1u64, 2], vec![3, 4, 5]], |_, inner| {
            executor
                .execute(inner, |_, x| x * x)
                .map(|squares| squares.into_iter().sum::<u64>())
        });
        assert_eq!(outputs, Ok(vec![Ok(5), Ok(50)]));
    }
}

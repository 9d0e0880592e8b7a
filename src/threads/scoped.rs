// Copyright 2024-2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An executor spawning scoped worker threads for each batch of tasks.

use super::{collect_outputs, run_task, ParallelExecutor, TaskOutput, ThreadCount};
use crate::error::Result;
#[cfg(feature = "log_parallelism")]
use crate::macros::{log_info, log_trace};
use crate::macros::{log_debug, log_warn};
use crossbeam_utils::CachePadded;
// Platforms that support `libc::sched_setaffinity()`.
#[cfg(all(
    not(miri),
    any(
        target_os = "android",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "linux"
    )
))]
use nix::{
    sched::{sched_getaffinity, sched_setaffinity, CpuSet},
    unistd::Pid,
};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Policy to pin worker threads to CPUs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuPinningPolicy {
    /// Don't pin worker threads to CPUs.
    No,
    /// Pin each worker thread to a CPU, if CPU pinning is supported and
    /// implemented on this platform.
    IfSupported,
    /// Pin each worker thread to a CPU. If CPU pinning isn't supported on this
    /// platform (or not implemented), or if the calling thread isn't allowed
    /// to run on CPUs `0..num_threads`, building an executor will panic.
    ///
    /// A worker that still fails to pin itself at run time (for example
    /// because the allowed CPUs changed since the executor was built) panics
    /// outside of any task, and this panic propagates out of
    /// [`execute()`](ParallelExecutor::execute).
    Always,
}

/// A builder for [`ScopedExecutor`].
#[derive(Clone, Copy, Debug)]
pub struct ExecutorBuilder {
    /// Maximal number of worker threads to spawn for each batch of tasks.
    pub num_threads: ThreadCount,
    /// Policy to pin worker threads to CPUs.
    pub cpu_pinning: CpuPinningPolicy,
}

impl Default for ExecutorBuilder {
    fn default() -> Self {
        Self {
            num_threads: ThreadCount::AvailableParallelism,
            cpu_pinning: CpuPinningPolicy::No,
        }
    }
}

impl ExecutorBuilder {
    /// Creates an executor.
    ///
    /// ```
    /// # use transducer::prelude::*;
    /// let executor = ExecutorBuilder {
    ///     num_threads: ThreadCount::try_from(4).unwrap(),
    ///     cpu_pinning: CpuPinningPolicy::No,
    /// }
    /// .build();
    /// assert_eq!(executor.num_threads().get(), 4);
    ///
    /// let sum = completing(0u64, |acc: u64, x: u64| acc + x).combining(|a, b| a + b);
    /// let result = transduce_parallel(&executor, Identity, sum, 1..=100)?;
    /// assert_eq!(result, 5050);
    /// # Ok::<(), transducer::Error>(())
    /// ```
    pub fn build(&self) -> ScopedExecutor {
        #[cfg(any(
            miri,
            not(any(
                target_os = "android",
                target_os = "dragonfly",
                target_os = "freebsd",
                target_os = "linux"
            ))
        ))]
        match self.cpu_pinning {
            CpuPinningPolicy::No => (),
            CpuPinningPolicy::IfSupported => {
                log_warn!("Pinning threads to CPUs is not implemented on this platform.")
            }
            CpuPinningPolicy::Always => {
                panic!("Pinning threads to CPUs is not implemented on this platform.")
            }
        }

        let num_threads = self.num_threads.count();
        #[cfg(all(
            not(miri),
            any(
                target_os = "android",
                target_os = "dragonfly",
                target_os = "freebsd",
                target_os = "linux"
            )
        ))]
        if self.cpu_pinning == CpuPinningPolicy::Always {
            check_pinnable(num_threads);
        }

        ScopedExecutor {
            num_threads,
            cpu_pinning: self.cpu_pinning,
        }
    }
}

/// Panics unless the calling thread may run on each of the CPUs that the
/// workers will pin themselves to.
#[cfg(all(
    not(miri),
    any(
        target_os = "android",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "linux"
    )
))]
fn check_pinnable(num_threads: NonZeroUsize) {
    let allowed = match sched_getaffinity(Pid::from_raw(0)) {
        Ok(allowed) => allowed,
        Err(e) => panic!("Failed to get the CPU affinity: {e}"),
    };
    if let Some(cpu) = (0..num_threads.get()).find(|&cpu| !allowed.is_set(cpu).unwrap_or(false)) {
        panic!("Cannot pin worker thread #{cpu} to CPU #{cpu}: this CPU isn't allowed");
    }
}

/// An executor spawning up to a fixed number of scoped worker threads for
/// each batch of tasks.
///
/// Workers claim tasks one at a time from a shared counter, so that a worker
/// stuck on a large partition doesn't hold back the others. All the threads
/// are joined before [`execute()`](ParallelExecutor::execute) returns.
#[derive(Debug)]
pub struct ScopedExecutor {
    num_threads: NonZeroUsize,
    cpu_pinning: CpuPinningPolicy,
}

impl ScopedExecutor {
    /// Returns the maximal number of worker threads spawned for each batch of
    /// tasks.
    pub fn num_threads(&self) -> NonZeroUsize {
        self.num_threads
    }
}

impl ParallelExecutor for ScopedExecutor {
    fn execute<W: Send, O: Send>(
        &self,
        work: Vec<W>,
        task: impl Fn(usize, W) -> O + Sync,
    ) -> Result<Vec<O>> {
        let num_tasks = work.len();
        let num_workers = self.num_threads.get().min(num_tasks);

        let work: Vec<Mutex<Option<W>>> = work.into_iter().map(|w| Mutex::new(Some(w))).collect();
        let outputs: Vec<TaskOutput<O>> = (0..num_tasks).map(|_| Mutex::new(None)).collect();
        let next_task = CachePadded::new(AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for id in 0..num_workers {
                let context = WorkerContext {
                    id,
                    cpu_pinning: self.cpu_pinning,
                    next_task: &next_task,
                    work: &work,
                    outputs: &outputs,
                };
                let task = &task;
                scope.spawn(move || context.run(task));
            }
            log_debug!("[main thread] Spawned {num_workers} threads for {num_tasks} tasks");
        });
        log_debug!("[main thread] Joined all threads");

        collect_outputs(outputs)
    }
}

/// State shared by a worker thread with the other workers of a batch.
struct WorkerContext<'a, W, O> {
    id: usize,
    cpu_pinning: CpuPinningPolicy,
    next_task: &'a CachePadded<AtomicUsize>,
    work: &'a [Mutex<Option<W>>],
    outputs: &'a [TaskOutput<O>],
}

impl<W, O> WorkerContext<'_, W, O> {
    /// Main function run by the worker thread.
    fn run(self, task: &impl Fn(usize, W) -> O) {
        self.pin_to_cpu();

        #[cfg(feature = "log_parallelism")]
        let mut num_claimed = 0;
        loop {
            let index = self.next_task.fetch_add(1, Ordering::Relaxed);
            if index >= self.work.len() {
                break;
            }
            #[cfg(feature = "log_parallelism")]
            {
                log_trace!("[thread {}] Claimed task #{index}", self.id);
                num_claimed += 1;
            }

            let item = self.work[index]
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(item) = item {
                let output = run_task(task, index, item);
                *self.outputs[index]
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(output);
            }
        }

        #[cfg(feature = "log_parallelism")]
        log_info!("[thread {}] Ran {num_claimed} tasks", self.id);
    }

    #[cfg(all(
        not(miri),
        any(
            target_os = "android",
            target_os = "dragonfly",
            target_os = "freebsd",
            target_os = "linux"
        )
    ))]
    fn pin_to_cpu(&self) {
        let id = self.id;
        match self.cpu_pinning {
            CpuPinningPolicy::No => (),
            CpuPinningPolicy::IfSupported => {
                let mut cpu_set = CpuSet::new();
                if let Err(_e) = cpu_set.set(id) {
                    log_warn!("Failed to set CPU affinity for thread #{id}: {_e}");
                } else if let Err(_e) = sched_setaffinity(Pid::from_raw(0), &cpu_set) {
                    log_warn!("Failed to set CPU affinity for thread #{id}: {_e}");
                } else {
                    log_debug!("Pinned thread #{id} to CPU #{id}");
                }
            }
            CpuPinningPolicy::Always => {
                let mut cpu_set = CpuSet::new();
                if let Err(e) = cpu_set.set(id) {
                    panic!("Failed to set CPU affinity for thread #{id}: {e}");
                } else if let Err(e) = sched_setaffinity(Pid::from_raw(0), &cpu_set) {
                    panic!("Failed to set CPU affinity for thread #{id}: {e}");
                } else {
                    log_debug!("Pinned thread #{id} to CPU #{id}");
                }
            }
        }
    }

    #[cfg(any(
        miri,
        not(any(
            target_os = "android",
            target_os = "dragonfly",
            target_os = "freebsd",
            target_os = "linux"
        ))
    ))]
    fn pin_to_cpu(&self) {}
}

// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parallel reduction over partitions of the source.

use crate::core::driver::fold_steps;
use crate::error::{Error, Result};
#[cfg(feature = "log_parallelism")]
use crate::macros::log_info;
use crate::macros::{log_debug, log_warn};
use crate::reducers::Appending;
use crate::threads::ParallelExecutor;
use crate::{transduce, Reducer, Step, Transducer};
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::ops::ControlFlow;

/// Geometric partitioning of a source: the first partition holds
/// `first_size` items, and each subsequent partition is `growth_factor` times
/// larger than the previous one.
///
/// Small partitions first give the workers something to do early on, while
/// larger partitions later amortize the dispatch overhead. The default
/// partitioning starts with a single item and doubles the size each time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeometricPartitioning {
    first_size: NonZeroUsize,
    growth_factor: usize,
}

impl Default for GeometricPartitioning {
    fn default() -> Self {
        Self {
            first_size: NonZeroUsize::MIN,
            growth_factor: 2,
        }
    }
}

impl GeometricPartitioning {
    /// Creates a geometric partitioning. Fails if `first_size` is zero, or if
    /// `growth_factor` is less than 2.
    pub fn new(first_size: usize, growth_factor: usize) -> Result<Self> {
        let first_size = NonZeroUsize::new(first_size).ok_or(Error::InvalidStageConfig {
            stage: "geometric_partitioning",
            reason: "first size must be at least 1",
        })?;
        if growth_factor < 2 {
            return Err(Error::InvalidStageConfig {
                stage: "geometric_partitioning",
                reason: "growth factor must be at least 2",
            });
        }
        Ok(Self {
            first_size,
            growth_factor,
        })
    }

    /// Size of the first partition.
    pub fn first_size(&self) -> NonZeroUsize {
        self.first_size
    }

    /// Factor by which the size grows from one partition to the next.
    pub fn growth_factor(&self) -> usize {
        self.growth_factor
    }

    /// Eagerly splits the source into partitions.
    ///
    /// ```
    /// # use transducer::prelude::*;
    /// let partitions = GeometricPartitioning::default().partition(1..=10);
    /// assert_eq!(
    ///     partitions,
    ///     [vec![1], vec![2, 3], vec![4, 5, 6, 7], vec![8, 9, 10]]
    /// );
    /// ```
    pub fn partition<I: IntoIterator>(self, source: I) -> Vec<Vec<I::Item>> {
        transduce(geometric_partitioning(self), Appending, source)
    }
}

/// Transducer returned by [`geometric_partitioning()`].
#[derive(Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Partitioning<T> {
    config: GeometricPartitioning,
    _phantom: PhantomData<fn(T) -> T>,
}

impl<T> Clone for Partitioning<T> {
    fn clone(&self) -> Self {
        geometric_partitioning(self.config)
    }
}

/// Creates a transducer forwarding consecutive partitions of the items, with
/// geometrically growing sizes.
///
/// The last partition may be shorter: it is forwarded when the reduction
/// completes.
pub fn geometric_partitioning<T>(config: GeometricPartitioning) -> Partitioning<T> {
    Partitioning {
        config,
        _phantom: PhantomData,
    }
}

/// Reducer produced by [`Partitioning`].
pub struct PartitioningReducer<T, R> {
    target_size: usize,
    growth_factor: usize,
    pending: Vec<T>,
    terminated: bool,
    inner: R,
}

impl<T, R> Transducer<R> for Partitioning<T> {
    type Reducer = PartitioningReducer<T, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        let target_size = self.config.first_size.get();
        PartitioningReducer {
            target_size,
            growth_factor: self.config.growth_factor,
            pending: Vec::with_capacity(target_size),
            terminated: false,
            inner,
        }
    }
}

impl<T, R: Reducer<Vec<T>>> Reducer<T> for PartitioningReducer<T, R> {
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        if self.terminated {
            return ControlFlow::Break(acc);
        }
        self.pending.push(item);
        if self.pending.len() < self.target_size {
            return ControlFlow::Continue(acc);
        }

        self.target_size = self.target_size.saturating_mul(self.growth_factor);
        let partition = std::mem::take(&mut self.pending);
        #[cfg(feature = "log_parallelism")]
        log_info!("Emitting a partition of {} items", partition.len());
        let step = self.inner.step(acc, partition);
        self.terminated = step.is_break();
        step
    }

    fn complete(mut self, mut acc: R::Acc) -> R::Acc {
        if !self.terminated && !self.pending.is_empty() {
            let partition = std::mem::take(&mut self.pending);
            #[cfg(feature = "log_parallelism")]
            log_info!("Emitting a trailing partition of {} items", partition.len());
            acc = match self.inner.step(acc, partition) {
                ControlFlow::Continue(acc) | ControlFlow::Break(acc) => acc,
            };
        }
        self.inner.complete(acc)
    }
}

/// Parallel driver, reducing partitions of the source on an executor and
/// combining the partial results.
///
/// ```
/// # use transducer::prelude::*;
/// let partitioning = GeometricPartitioning::new(4, 3)?;
/// let driver = ParallelTransduce::new(&Sequential).with_partitioning(partitioning);
///
/// let words = driver.transduce(
///     mapping(|w: &str| w.to_uppercase()),
///     Concatenating,
///     ["a", "b", "c", "d", "e", "f"],
/// )?;
/// assert_eq!(words, "ABCDEF");
/// # Ok::<(), transducer::Error>(())
/// ```
#[derive(Debug)]
pub struct ParallelTransduce<'a, E> {
    executor: &'a E,
    partitioning: GeometricPartitioning,
}

impl<E> Clone for ParallelTransduce<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ParallelTransduce<'_, E> {}

impl<'a, E: ParallelExecutor> ParallelTransduce<'a, E> {
    /// Creates a parallel driver running on the given executor, with the
    /// default partitioning.
    pub fn new(executor: &'a E) -> Self {
        Self {
            executor,
            partitioning: GeometricPartitioning::default(),
        }
    }

    /// Replaces the partitioning of the source.
    pub fn with_partitioning(self, partitioning: GeometricPartitioning) -> Self {
        Self {
            partitioning,
            ..self
        }
    }

    /// Reduces the source in parallel, seeding each partition (and the final
    /// combination) with the reducer's [`initial()`](Reducer::initial) value.
    ///
    /// Fails with [`Error::NotCombinable`] before touching the source if the
    /// reducer wrapped by the transducer cannot combine partial results, and
    /// with [`Error::WorkerPanicked`] if reducing a partition panicked.
    pub fn transduce<X, R, I>(
        &self,
        transducer: X,
        reducer: R,
        source: I,
    ) -> Result<<X::Reducer as Reducer<I::Item>>::Acc>
    where
        I: IntoIterator,
        I::Item: Send,
        X: Transducer<R> + Clone + Sync,
        R: Clone + Sync,
        X::Reducer: Reducer<I::Item>,
        <X::Reducer as Reducer<I::Item>>::Acc: Send,
    {
        self.run(transducer, reducer, source, |main| {
            Reducer::<I::Item>::initial(main)
        })
    }

    /// Reduces the source in parallel like [`transduce()`](Self::transduce),
    /// but seeding each partition (and the final combination) with a fresh
    /// value returned by `seed`.
    ///
    /// The seed must be a neutral element of the combination, otherwise it
    /// will be accounted for once per partition.
    pub fn transduce_from<X, R, I>(
        &self,
        transducer: X,
        reducer: R,
        source: I,
        seed: impl Fn() -> <X::Reducer as Reducer<I::Item>>::Acc,
    ) -> Result<<X::Reducer as Reducer<I::Item>>::Acc>
    where
        I: IntoIterator,
        I::Item: Send,
        X: Transducer<R> + Clone + Sync,
        R: Clone + Sync,
        X::Reducer: Reducer<I::Item>,
        <X::Reducer as Reducer<I::Item>>::Acc: Send,
    {
        self.run(transducer, reducer, source, |_| seed())
    }

    fn run<X, R, I>(
        &self,
        transducer: X,
        reducer: R,
        source: I,
        seed: impl Fn(&X::Reducer) -> <X::Reducer as Reducer<I::Item>>::Acc,
    ) -> Result<<X::Reducer as Reducer<I::Item>>::Acc>
    where
        I: IntoIterator,
        I::Item: Send,
        X: Transducer<R> + Clone + Sync,
        R: Clone + Sync,
        X::Reducer: Reducer<I::Item>,
        <X::Reducer as Reducer<I::Item>>::Acc: Send,
    {
        let main = transducer.clone().apply(reducer.clone());

        // Two independent seeds, so that a mutable seed is never aliased.
        let (left, right) = (seed(&main), seed(&main));
        if main.combine(left, right).is_none() {
            log_warn!("Rejecting a parallel reduction whose reducer cannot combine partial results");
            return Err(Error::NotCombinable);
        }

        let partitions = self.partitioning.partition(source);
        log_debug!(
            "[main thread] Dispatching {} partitions to the executor",
            partitions.len()
        );

        let work: Vec<_> = partitions
            .into_iter()
            .map(|partition| (partition, seed(&main)))
            .collect();
        let partials = self.executor.execute(work, |_index, (partition, acc)| {
            let mut worker = transducer.clone().apply(reducer.clone());
            let partial = fold_steps(&mut worker, acc, partition);
            #[cfg(feature = "log_parallelism")]
            log_info!("Reduced partition #{_index}");
            partial
        })?;

        let mut combined = seed(&main);
        for partial in partials {
            combined = main.combine(combined, partial).ok_or(Error::NotCombinable)?;
        }
        Ok(main.complete(combined))
    }
}

/// Reduces the source in parallel on the given executor, with the default
/// partitioning.
///
/// See [`ParallelTransduce::transduce()`] for the failure modes.
///
/// ```
/// # use transducer::prelude::*;
/// let executor = ExecutorBuilder::default().build();
/// let evens = transduce_parallel(
///     &executor,
///     compose!(filtering(|x: &u32| x % 2 == 0), mapping(|x: u32| x / 2)),
///     Appending,
///     0..20,
/// )?;
/// assert_eq!(evens, (0..10).collect::<Vec<_>>());
///
/// let error = transduce_parallel(&executor, taking(3), Appending, 0..20);
/// assert_eq!(error, Err(Error::NotCombinable));
/// # Ok::<(), transducer::Error>(())
/// ```
pub fn transduce_parallel<E, X, R, I>(
    executor: &E,
    transducer: X,
    reducer: R,
    source: I,
) -> Result<<X::Reducer as Reducer<I::Item>>::Acc>
where
    E: ParallelExecutor,
    I: IntoIterator,
    I::Item: Send,
    X: Transducer<R> + Clone + Sync,
    R: Clone + Sync,
    X::Reducer: Reducer<I::Item>,
    <X::Reducer as Reducer<I::Item>>::Acc: Send,
{
    ParallelTransduce::new(executor).transduce(transducer, reducer, source)
}

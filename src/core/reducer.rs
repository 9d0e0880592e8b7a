// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The reducer and transducer protocols.

use std::ops::ControlFlow;

/// Result of a single reduction step.
///
/// [`ControlFlow::Continue`] carries the accumulator to feed the next item
/// into. [`ControlFlow::Break`] is the early-termination signal: it carries the
/// final accumulator, and drivers stop pulling items from the source as soon
/// as they observe it, before proceeding to [`complete()`](Reducer::complete).
pub type Step<Acc> = ControlFlow<Acc, Acc>;

/// Target of a fold, consuming items of type `Item`.
///
/// A reduction calls [`initial()`](Self::initial) (unless the caller provides
/// a seed), then [`step()`](Self::step) zero or more times, then
/// [`complete()`](Self::complete) exactly once. The latter consumes the
/// reducer, so no step can happen after completion.
///
/// ```
/// # use transducer::{Reducer, Step};
/// # use std::ops::ControlFlow;
/// /// Sums items until the total reaches a threshold.
/// struct SumUntil(u64);
///
/// impl Reducer<u64> for SumUntil {
///     type Acc = u64;
///
///     fn initial(&self) -> u64 {
///         0
///     }
///
///     fn step(&mut self, acc: u64, item: u64) -> Step<u64> {
///         let acc = acc + item;
///         if acc >= self.0 {
///             ControlFlow::Break(acc)
///         } else {
///             ControlFlow::Continue(acc)
///         }
///     }
/// }
///
/// let total = transducer::transduce(transducer::Identity, SumUntil(10), 1..);
/// assert_eq!(total, 10);
/// ```
pub trait Reducer<Item> {
    /// Type of the accumulated value.
    type Acc;

    /// Produces a seed accumulator.
    fn initial(&self) -> Self::Acc;

    /// Accumulates the given item.
    fn step(&mut self, acc: Self::Acc, item: Item) -> Step<Self::Acc>;

    /// Finalizes the accumulator, once all items have been processed.
    ///
    /// The default implementation returns the accumulator unchanged.
    fn complete(self, acc: Self::Acc) -> Self::Acc
    where
        Self: Sized,
    {
        acc
    }

    /// Combines two partial accumulators, obtained by reducing two adjacent
    /// parts of a source, into one.
    ///
    /// Returning [`None`] signals that this reducer cannot merge partial
    /// results, and therefore cannot be used for parallel reduction. This is
    /// the default.
    fn combine(&self, left: Self::Acc, right: Self::Acc) -> Option<Self::Acc> {
        let _ = (left, right);
        None
    }
}

/// A reduction stage that wraps a reducer into another reducer.
///
/// Values implementing this trait are the configuration of a stage (a mapping
/// function, a batch size, etc.). The stage's mutable state lives in the
/// wrapper reducer created by [`apply()`](Self::apply), so each call builds a
/// fresh, independent pipeline.
pub trait Transducer<R> {
    /// The wrapper reducer.
    type Reducer;

    /// Wraps the given inner reducer.
    fn apply(self, reducer: R) -> Self::Reducer;
}

/// The transducer that leaves reducers unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl<R> Transducer<R> for Identity {
    type Reducer = R;

    fn apply(self, reducer: R) -> R {
        reducer
    }
}

/// Right-to-left composition of two transducers, see [`compose()`].
#[derive(Clone, Copy, Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Compose<Outer, Inner> {
    outer: Outer,
    inner: Inner,
}

impl<Outer, Inner> Compose<Outer, Inner> {
    /// Composes the given transducers, see [`compose()`].
    pub fn new(outer: Outer, inner: Inner) -> Self {
        Self { outer, inner }
    }
}

impl<R, Outer, Inner> Transducer<R> for Compose<Outer, Inner>
where
    Inner: Transducer<R>,
    Outer: Transducer<Inner::Reducer>,
{
    type Reducer = Outer::Reducer;

    fn apply(self, reducer: R) -> Self::Reducer {
        self.outer.apply(self.inner.apply(reducer))
    }
}

/// Composes two transducers, such that items flow through `outer` before
/// flowing through `inner`.
///
/// See the [`compose!`](crate::compose) macro to compose more than two
/// transducers at once.
pub fn compose<Outer, Inner>(outer: Outer, inner: Inner) -> Compose<Outer, Inner> {
    Compose::new(outer, inner)
}

// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sequential and lazy transduction drivers.

use super::reducer::{Reducer, Step, Transducer};
use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::ops::ControlFlow;

/// Folds the given items into the accumulator, stopping at the first
/// early-termination signal.
///
/// This only runs the steps of a reduction: it is the caller's responsibility
/// to complete the accumulator (or to combine it with others first).
pub(crate) fn fold_steps<Item, R: Reducer<Item>>(
    reducer: &mut R,
    mut acc: R::Acc,
    source: impl IntoIterator<Item = Item>,
) -> R::Acc {
    for item in source {
        match reducer.step(acc, item) {
            ControlFlow::Continue(next) => acc = next,
            ControlFlow::Break(last) => return last,
        }
    }
    acc
}

/// Eagerly reduces the source with the given reducer, wrapped by the given
/// transducer, starting from the reducer's [`initial()`](Reducer::initial)
/// seed.
///
/// ```
/// # use transducer::prelude::*;
/// let result: Vec<i32> = transduce(
///     compose!(
///         mapping(|x: i32| x * x),
///         filtering(|x: &i32| x % 5 != 0),
///         taking(6),
///     ),
///     Appending,
///     0..20,
/// );
/// assert_eq!(result, [1, 4, 9, 16, 36, 49]);
/// ```
pub fn transduce<X, R, I>(
    transducer: X,
    reducer: R,
    source: I,
) -> <X::Reducer as Reducer<I::Item>>::Acc
where
    I: IntoIterator,
    X: Transducer<R>,
    X::Reducer: Reducer<I::Item>,
{
    let reducer = transducer.apply(reducer);
    let seed = reducer.initial();
    run(reducer, seed, source)
}

/// Eagerly reduces the source like [`transduce()`], but starting from the
/// given seed rather than the reducer's initial value.
///
/// ```
/// # use transducer::prelude::*;
/// let result = transduce_from(mapping(|x: i32| x * 10), Appending, [1, 2], vec![0]);
/// assert_eq!(result, [0, 10, 20]);
/// ```
pub fn transduce_from<X, R, I>(
    transducer: X,
    reducer: R,
    source: I,
    seed: <X::Reducer as Reducer<I::Item>>::Acc,
) -> <X::Reducer as Reducer<I::Item>>::Acc
where
    I: IntoIterator,
    X: Transducer<R>,
    X::Reducer: Reducer<I::Item>,
{
    run(transducer.apply(reducer), seed, source)
}

fn run<Item, R: Reducer<Item>>(
    mut reducer: R,
    seed: R::Acc,
    source: impl IntoIterator<Item = Item>,
) -> R::Acc {
    let acc = fold_steps(&mut reducer, seed, source);
    reducer.complete(acc)
}

/// Terminal reducer of [`generate()`], queuing items until they are pulled.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pending;

impl<T> Reducer<T> for Pending {
    type Acc = VecDeque<T>;

    fn initial(&self) -> VecDeque<T> {
        VecDeque::new()
    }

    fn step(&mut self, mut acc: VecDeque<T>, item: T) -> Step<VecDeque<T>> {
        acc.push_back(item);
        ControlFlow::Continue(acc)
    }
}

/// Lazily applies the given transducer to the source.
///
/// Source items are pulled one at a time, and every item emitted by the
/// pipeline is yielded as soon as the source item that produced it has been
/// processed. Once the source is exhausted (or the pipeline signaled early
/// termination) the pipeline is completed, and its deferred emissions are
/// yielded last.
///
/// ```
/// # use transducer::prelude::*;
/// let mut squares = generate(mapping(|x: u64| x * x), 1..);
/// assert_eq!(squares.next(), Some(1));
/// assert_eq!(squares.next(), Some(4));
///
/// let batches: Vec<Vec<u32>> = generate(batching(2).unwrap(), 0..5).collect();
/// assert_eq!(batches, [vec![0, 1], vec![2, 3], vec![4]]);
/// ```
pub fn generate<X, I, T>(transducer: X, source: I) -> Generate<I::IntoIter, X::Reducer, T>
where
    I: IntoIterator,
    X: Transducer<Pending>,
    X::Reducer: Reducer<I::Item, Acc = VecDeque<T>>,
{
    Generate {
        source: source.into_iter(),
        state: GenerateState::Pulling(transducer.apply(Pending)),
        pending: VecDeque::new(),
    }
}

/// Iterator returned by [`generate()`].
#[must_use = "iterator adaptors are lazy"]
pub struct Generate<I, R, T> {
    source: I,
    state: GenerateState<R>,
    /// Items emitted by the pipeline but not pulled yet. This is the
    /// accumulator of the pipeline, moved out of here for each step.
    pending: VecDeque<T>,
}

enum GenerateState<R> {
    /// Source items are still being pulled.
    Pulling(R),
    /// The pipeline signaled early termination, it only remains to complete
    /// it.
    Reduced(R),
    /// The pipeline has been completed.
    Completed,
}

impl<I, R, T> Iterator for Generate<I, R, T>
where
    I: Iterator,
    R: Reducer<I::Item, Acc = VecDeque<T>>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }

            match std::mem::replace(&mut self.state, GenerateState::Completed) {
                GenerateState::Pulling(mut reducer) => match self.source.next() {
                    Some(item) => {
                        let acc = std::mem::take(&mut self.pending);
                        self.state = match reducer.step(acc, item) {
                            ControlFlow::Continue(acc) => {
                                self.pending = acc;
                                GenerateState::Pulling(reducer)
                            }
                            ControlFlow::Break(acc) => {
                                self.pending = acc;
                                GenerateState::Reduced(reducer)
                            }
                        };
                    }
                    None => {
                        let acc = std::mem::take(&mut self.pending);
                        self.pending = reducer.complete(acc);
                    }
                },
                GenerateState::Reduced(reducer) => {
                    let acc = std::mem::take(&mut self.pending);
                    self.pending = reducer.complete(acc);
                }
                GenerateState::Completed => return None,
            }
        }
    }
}

impl<I, R, T> FusedIterator for Generate<I, R, T>
where
    I: Iterator,
    R: Reducer<I::Item, Acc = VecDeque<T>>,
{
}

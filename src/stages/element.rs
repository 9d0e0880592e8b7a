// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stages emitting items as they arrive.

use crate::{Predicate, Reducer, Step, Transducer};
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::ControlFlow;

/// Transducer returned by [`mapping()`].
#[derive(Clone, Copy, Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Mapping<F> {
    f: F,
}

/// Creates a transducer forwarding `f(item)` for each item.
pub fn mapping<F>(f: F) -> Mapping<F> {
    Mapping { f }
}

/// Reducer produced by [`Mapping`].
pub struct MappingReducer<F, R> {
    f: F,
    inner: R,
}

impl<F, R> Transducer<R> for Mapping<F> {
    type Reducer = MappingReducer<F, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        MappingReducer { f: self.f, inner }
    }
}

impl<T, U, F, R> Reducer<T> for MappingReducer<F, R>
where
    F: FnMut(T) -> U,
    R: Reducer<U>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    #[inline(always)]
    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        self.inner.step(acc, (self.f)(item))
    }

    fn complete(self, acc: R::Acc) -> R::Acc {
        self.inner.complete(acc)
    }

    fn combine(&self, left: R::Acc, right: R::Acc) -> Option<R::Acc> {
        self.inner.combine(left, right)
    }
}

/// Transducer returned by [`filtering()`].
#[derive(Clone, Copy, Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Filtering<P> {
    predicate: P,
}

/// Creates a transducer forwarding the items that satisfy the predicate.
pub fn filtering<P>(predicate: P) -> Filtering<P> {
    Filtering { predicate }
}

/// Reducer produced by [`Filtering`].
pub struct FilteringReducer<P, R> {
    predicate: P,
    inner: R,
}

impl<P, R> Transducer<R> for Filtering<P> {
    type Reducer = FilteringReducer<P, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        FilteringReducer {
            predicate: self.predicate,
            inner,
        }
    }
}

impl<T, P, R> Reducer<T> for FilteringReducer<P, R>
where
    P: Predicate<T>,
    R: Reducer<T>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    #[inline(always)]
    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        if self.predicate.test(&item) {
            self.inner.step(acc, item)
        } else {
            ControlFlow::Continue(acc)
        }
    }

    fn complete(self, acc: R::Acc) -> R::Acc {
        self.inner.complete(acc)
    }

    fn combine(&self, left: R::Acc, right: R::Acc) -> Option<R::Acc> {
        self.inner.combine(left, right)
    }
}

/// Transducer returned by [`mapcatting()`].
#[derive(Clone, Copy, Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Mapcatting<F> {
    f: F,
}

/// Creates a transducer mapping each item to a sequence, and forwarding the
/// elements of that sequence one by one.
pub fn mapcatting<F>(f: F) -> Mapcatting<F> {
    Mapcatting { f }
}

/// Reducer produced by [`Mapcatting`].
pub struct MapcattingReducer<F, R> {
    f: F,
    inner: R,
}

impl<F, R> Transducer<R> for Mapcatting<F> {
    type Reducer = MapcattingReducer<F, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        MapcattingReducer { f: self.f, inner }
    }
}

impl<T, I, F, R> Reducer<T> for MapcattingReducer<F, R>
where
    F: FnMut(T) -> I,
    I: IntoIterator,
    R: Reducer<I::Item>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, mut acc: R::Acc, item: T) -> Step<R::Acc> {
        for sub_item in (self.f)(item) {
            match self.inner.step(acc, sub_item) {
                ControlFlow::Continue(next) => acc = next,
                reduced @ ControlFlow::Break(_) => return reduced,
            }
        }
        ControlFlow::Continue(acc)
    }

    fn complete(self, acc: R::Acc) -> R::Acc {
        self.inner.complete(acc)
    }

    fn combine(&self, left: R::Acc, right: R::Acc) -> Option<R::Acc> {
        self.inner.combine(left, right)
    }
}

/// Transducer returned by [`enumerating()`].
#[derive(Clone, Copy, Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Enumerating {
    start: usize,
}

/// Creates a transducer forwarding `(index, item)` pairs, with indices
/// counting up from `start`.
pub fn enumerating(start: usize) -> Enumerating {
    Enumerating { start }
}

/// Reducer produced by [`Enumerating`].
pub struct EnumeratingReducer<R> {
    next_index: usize,
    inner: R,
}

impl<R> Transducer<R> for Enumerating {
    type Reducer = EnumeratingReducer<R>;

    fn apply(self, inner: R) -> Self::Reducer {
        EnumeratingReducer {
            next_index: self.start,
            inner,
        }
    }
}

impl<T, R> Reducer<T> for EnumeratingReducer<R>
where
    R: Reducer<(usize, T)>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        let index = self.next_index;
        self.next_index += 1;
        self.inner.step(acc, (index, item))
    }

    fn complete(self, acc: R::Acc) -> R::Acc {
        self.inner.complete(acc)
    }
}

/// Transducer returned by [`pairwise()`].
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Pairwise<T> {
    _phantom: PhantomData<fn(T) -> T>,
}

impl<T> Clone for Pairwise<T> {
    fn clone(&self) -> Self {
        pairwise()
    }
}

/// Creates a transducer forwarding each pair of successive items
/// `(previous, current)`, starting from the second item.
pub fn pairwise<T>() -> Pairwise<T> {
    Pairwise {
        _phantom: PhantomData,
    }
}

/// Reducer produced by [`Pairwise`].
pub struct PairwiseReducer<T, R> {
    previous: Option<T>,
    inner: R,
}

impl<T, R> Transducer<R> for Pairwise<T> {
    type Reducer = PairwiseReducer<T, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        PairwiseReducer {
            previous: None,
            inner,
        }
    }
}

impl<T, R> Reducer<T> for PairwiseReducer<T, R>
where
    T: Clone,
    R: Reducer<(T, T)>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        match self.previous.replace(item.clone()) {
            None => ControlFlow::Continue(acc),
            Some(previous) => self.inner.step(acc, (previous, item)),
        }
    }

    fn complete(self, acc: R::Acc) -> R::Acc {
        self.inner.complete(acc)
    }
}

/// Transducer returned by [`distinct()`].
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Distinct<T> {
    _phantom: PhantomData<fn(T) -> T>,
}

impl<T> Clone for Distinct<T> {
    fn clone(&self) -> Self {
        distinct()
    }
}

/// Creates a transducer forwarding each item the first time it is seen.
///
/// All the distinct items are remembered until the reduction completes.
pub fn distinct<T>() -> Distinct<T> {
    Distinct {
        _phantom: PhantomData,
    }
}

/// Reducer produced by [`Distinct`].
pub struct DistinctReducer<T, R> {
    seen: HashSet<T>,
    inner: R,
}

impl<T, R> Transducer<R> for Distinct<T> {
    type Reducer = DistinctReducer<T, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        DistinctReducer {
            seen: HashSet::new(),
            inner,
        }
    }
}

impl<T, R> Reducer<T> for DistinctReducer<T, R>
where
    T: Clone + Eq + Hash,
    R: Reducer<T>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        if self.seen.contains(&item) {
            ControlFlow::Continue(acc)
        } else {
            self.seen.insert(item.clone());
            self.inner.step(acc, item)
        }
    }

    fn complete(self, acc: R::Acc) -> R::Acc {
        self.inner.complete(acc)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reducers::{Appending, Concatenating};
    use crate::{compose, generate, transduce, Identity};

    #[test]
    fn test_mapping() {
        let result = transduce(mapping(|x: i32| x * x), Appending, [1, 2, 3]);
        assert_eq!(result, [1, 4, 9]);
    }

    #[test]
    fn test_mapping_changes_type() {
        let result = transduce(mapping(|x: u8| x.to_string()), Concatenating, [1u8, 23, 4]);
        assert_eq!(result, "1234");
    }

    #[test]
    fn test_filtering() {
        let result = transduce(filtering(|x: &i32| x % 2 == 0), Appending, 0..10);
        assert_eq!(result, [0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_mapcatting() {
        let result = transduce(mapcatting(|x: usize| vec![x; x]), Appending, 0..4);
        assert_eq!(result, [1, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_mapcatting_stops_mid_sequence() {
        // The early-termination signal raised by the second element of the
        // first sequence stops the reduction right away.
        let result: Vec<u32> = transduce(
            compose!(mapcatting(|x: u32| [x, x + 1, x + 2]), crate::taking(2)),
            Appending,
            [10, 20],
        );
        assert_eq!(result, [10, 11]);
    }

    #[test]
    fn test_enumerating() {
        let result = transduce(enumerating(5), Appending, ['a', 'b', 'c']);
        assert_eq!(result, [(5, 'a'), (6, 'b'), (7, 'c')]);
    }

    #[test]
    fn test_pairwise() {
        let result = transduce(pairwise(), Appending, [1, 2, 3, 4]);
        assert_eq!(result, [(1, 2), (2, 3), (3, 4)]);

        let result = transduce(pairwise(), Appending, [1]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_distinct() {
        let result = transduce(distinct(), Appending, [1, 2, 1, 3, 2, 4]);
        assert_eq!(result, [1, 2, 3, 4]);
    }

    #[test]
    fn test_distinct_state_is_per_reduction() {
        let stage = distinct::<i32>();
        let first = transduce(stage.clone(), Appending, [1, 2]);
        let second = transduce(stage, Appending, [2, 1]);
        assert_eq!(first, [1, 2]);
        assert_eq!(second, [2, 1]);
    }

    #[test]
    fn test_stateless_stages_combine() {
        let reducer = compose!(
            mapping(|x: i32| x + 1),
            filtering(|x: &i32| *x > 0),
            mapcatting(|x: i32| [x]),
        )
        .apply(Appending);
        assert_eq!(
            Reducer::<i32>::combine(&reducer, vec![1], vec![2]),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn test_stateful_stages_do_not_combine() {
        let reducer = distinct::<i32>().apply(Appending);
        assert_eq!(reducer.combine(vec![1], vec![2]), None);

        let reducer = enumerating(0).apply(Appending);
        assert_eq!(Reducer::<i32>::combine(&reducer, vec![], vec![]), None);
    }

    #[test]
    fn test_generate_matches_transduce() {
        let make = || {
            compose!(
                mapping(|x: i32| x * x),
                filtering(|x: &i32| x % 5 != 0),
                enumerating(1),
                mapping(|(i, x): (usize, i32)| i as i32 * x),
            )
        };
        let eager = transduce(make(), Appending, 0..20);
        let lazy: Vec<i32> = generate(make(), 0..20).collect();
        assert_eq!(eager, lazy);

        let eager = transduce(Identity, Appending, 0..20);
        let lazy: Vec<i32> = generate(Identity, 0..20).collect();
        assert_eq!(eager, lazy);
    }
}

// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stages selecting a prefix of the items.

use crate::{Always, Predicate, Reducer, Step, Transducer};
use std::ops::ControlFlow;

/// Transducer returned by [`taking()`].
#[derive(Clone, Copy, Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Taking {
    count: usize,
}

/// Creates a transducer forwarding the first `count` items.
///
/// Once `count` items have been forwarded, the stage signals early
/// termination, so that no further item is pulled from the source.
///
/// ```
/// # use transducer::prelude::*;
/// let result: Vec<u64> = transduce(taking(3), Appending, 10..);
/// assert_eq!(result, [10, 11, 12]);
/// ```
pub fn taking(count: usize) -> Taking {
    Taking { count }
}

/// Reducer produced by [`Taking`].
pub struct TakingReducer<R> {
    remaining: usize,
    inner: R,
}

impl<R> Transducer<R> for Taking {
    type Reducer = TakingReducer<R>;

    fn apply(self, inner: R) -> Self::Reducer {
        TakingReducer {
            remaining: self.count,
            inner,
        }
    }
}

impl<T, R: Reducer<T>> Reducer<T> for TakingReducer<R> {
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        if self.remaining == 0 {
            return ControlFlow::Break(acc);
        }
        self.remaining -= 1;
        match self.inner.step(acc, item) {
            ControlFlow::Continue(acc) if self.remaining == 0 => ControlFlow::Break(acc),
            step => step,
        }
    }

    fn complete(self, acc: R::Acc) -> R::Acc {
        self.inner.complete(acc)
    }
}

/// Transducer returned by [`dropping_while()`].
#[derive(Clone, Copy, Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct DroppingWhile<P> {
    predicate: P,
}

/// Creates a transducer suppressing the leading items that satisfy the
/// predicate.
///
/// As soon as one item fails the predicate, it and all subsequent items are
/// forwarded, without evaluating the predicate anymore.
pub fn dropping_while<P>(predicate: P) -> DroppingWhile<P> {
    DroppingWhile { predicate }
}

/// Reducer produced by [`DroppingWhile`].
pub struct DroppingWhileReducer<P, R> {
    predicate: P,
    dropping: bool,
    inner: R,
}

impl<P, R> Transducer<R> for DroppingWhile<P> {
    type Reducer = DroppingWhileReducer<P, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        DroppingWhileReducer {
            predicate: self.predicate,
            dropping: true,
            inner,
        }
    }
}

impl<T, P, R> Reducer<T> for DroppingWhileReducer<P, R>
where
    P: Predicate<T>,
    R: Reducer<T>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        self.dropping = self.dropping && self.predicate.test(&item);
        if self.dropping {
            ControlFlow::Continue(acc)
        } else {
            self.inner.step(acc, item)
        }
    }

    fn complete(self, acc: R::Acc) -> R::Acc {
        self.inner.complete(acc)
    }
}

/// Transducer returned by [`first()`] and [`first_where()`].
#[derive(Clone, Copy, Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct First<P> {
    predicate: P,
}

/// Creates a transducer forwarding the first item, then terminating the
/// reduction.
///
/// ```
/// # use transducer::prelude::*;
/// let result: Vec<u32> = transduce(first(), Appending, 5..);
/// assert_eq!(result, [5]);
/// ```
pub fn first() -> First<Always> {
    first_where(Always)
}

/// Creates a transducer forwarding the first item that satisfies the
/// predicate, then terminating the reduction.
pub fn first_where<P>(predicate: P) -> First<P> {
    First { predicate }
}

/// Reducer produced by [`First`].
pub struct FirstReducer<P, R> {
    predicate: P,
    done: bool,
    inner: R,
}

impl<P, R> Transducer<R> for First<P> {
    type Reducer = FirstReducer<P, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        FirstReducer {
            predicate: self.predicate,
            done: false,
            inner,
        }
    }
}

impl<T, P, R> Reducer<T> for FirstReducer<P, R>
where
    P: Predicate<T>,
    R: Reducer<T>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        if self.done {
            return ControlFlow::Break(acc);
        }
        if !self.predicate.test(&item) {
            return ControlFlow::Continue(acc);
        }
        self.done = true;
        match self.inner.step(acc, item) {
            ControlFlow::Continue(acc) | ControlFlow::Break(acc) => ControlFlow::Break(acc),
        }
    }

    fn complete(self, acc: R::Acc) -> R::Acc {
        self.inner.complete(acc)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reducers::{Appending, ExpectingSingle};
    use crate::{batching, compose, generate, mapping, transduce, windowing_padded};
    use std::cell::Cell;

    #[test]
    fn test_taking() {
        let result = transduce(taking(3), Appending, [1, 2, 3, 4, 5]);
        assert_eq!(result, [1, 2, 3]);
    }

    #[test]
    fn test_taking_zero() {
        let result = transduce(taking(0), Appending, [1, 2, 3]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_taking_more_than_available() {
        let result = transduce(taking(10), Appending, [1, 2, 3]);
        assert_eq!(result, [1, 2, 3]);
    }

    #[test]
    fn test_taking_stops_pulling() {
        let pulled = Cell::new(0);
        let source = (0..100).inspect(|_| pulled.set(pulled.get() + 1));
        let result = transduce(taking(4), Appending, source);
        assert_eq!(result, [0, 1, 2, 3]);
        assert_eq!(pulled.get(), 4);
    }

    #[test]
    fn test_taking_infinite_source() {
        let result: Vec<u64> = generate(taking(5), 0..).collect();
        assert_eq!(result, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_dropping_while() {
        let result = transduce(dropping_while(|x: &i32| *x < 3), Appending, [1, 2, 3, 1, 4]);
        // 1 is forwarded although it satisfies the predicate.
        assert_eq!(result, [3, 1, 4]);
    }

    #[test]
    fn test_dropping_while_everything() {
        let result = transduce(dropping_while(|_: &i32| true), Appending, [1, 2, 3]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_first() {
        let pulled = Cell::new(0);
        let source = [5, 6, 7].into_iter().inspect(|_| pulled.set(pulled.get() + 1));
        let result = transduce(first(), ExpectingSingle::new(), source);
        assert_eq!(result, Some(5));
        assert_eq!(pulled.get(), 1);
    }

    #[test]
    fn test_first_where_infinite_source() {
        let result = transduce(
            first_where(|x: &u64| x * x > 1000),
            ExpectingSingle::new(),
            0..,
        );
        assert_eq!(result, Some(32));
    }

    #[test]
    fn test_first_of_nothing() {
        let result = transduce(first_where(|x: &i32| *x > 10), Appending, [1, 2, 3]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_first_after_termination() {
        let mut reducer = first().apply(Appending);
        let acc = Reducer::<i32>::initial(&reducer);
        let acc = match reducer.step(acc, 1) {
            ControlFlow::Break(acc) => acc,
            ControlFlow::Continue(_) => panic!("didn't terminate"),
        };
        assert_eq!(reducer.step(acc, 2), ControlFlow::Break(vec![1]));
    }

    #[test]
    fn test_first_after_deferred_emissions() {
        let result = transduce(
            compose!(windowing_padded(3, 0).unwrap(), first()),
            ExpectingSingle::new(),
            [1, 2, 3],
        );
        assert_eq!(result, Some(vec![0, 0, 1]));

        let lazy: Vec<Vec<i32>> =
            generate(compose!(batching(2).unwrap(), first()), [1, 2, 3]).collect();
        assert_eq!(lazy, [vec![1, 2]]);
    }

    #[test]
    fn test_lazy_pipeline() {
        let make = || {
            compose!(
                mapping(|x: i32| x * x),
                crate::filtering(|x: &i32| x % 5 != 0),
                taking(6),
                dropping_while(|x: &i32| *x < 15),
                crate::distinct(),
            )
        };
        let lazy: Vec<i32> = generate(make(), 0..20).collect();
        assert_eq!(lazy, [16, 36, 49]);
        assert_eq!(transduce(make(), Appending, 0..20), lazy);
    }
}

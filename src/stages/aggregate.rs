// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stages accumulating all the items, and emitting only when the reduction
//! completes.
//!
//! None of these stages forward anything during the steps of a reduction.

use crate::{Always, Itself, KeyFn, Predicate, Reducer, Step, Transducer};
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::ControlFlow;

/// Steps the inner reducer with each item, stopping at the first
/// early-termination signal.
fn emit_all<I, R>(inner: &mut R, acc: R::Acc, items: I) -> R::Acc
where
    I: IntoIterator,
    R: Reducer<I::Item>,
{
    crate::core::driver::fold_steps(inner, acc, items)
}

/// Transducer returned by [`last()`] and [`last_where()`].
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Last<T, P> {
    predicate: P,
    _phantom: PhantomData<fn(T) -> T>,
}

impl<T, P: Clone> Clone for Last<T, P> {
    fn clone(&self) -> Self {
        last_where(self.predicate.clone())
    }
}

/// Creates a transducer forwarding the last item, if any, when the reduction
/// completes.
pub fn last<T>() -> Last<T, Always> {
    last_where(Always)
}

/// Creates a transducer forwarding the last item that satisfies the
/// predicate, if any, when the reduction completes.
pub fn last_where<T, P>(predicate: P) -> Last<T, P> {
    Last {
        predicate,
        _phantom: PhantomData,
    }
}

/// Reducer produced by [`Last`].
pub struct LastReducer<T, P, R> {
    predicate: P,
    last_seen: Option<T>,
    inner: R,
}

impl<T, P, R> Transducer<R> for Last<T, P> {
    type Reducer = LastReducer<T, P, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        LastReducer {
            predicate: self.predicate,
            last_seen: None,
            inner,
        }
    }
}

impl<T, P, R> Reducer<T> for LastReducer<T, P, R>
where
    P: Predicate<T>,
    R: Reducer<T>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        if self.predicate.test(&item) {
            self.last_seen = Some(item);
        }
        ControlFlow::Continue(acc)
    }

    fn complete(mut self, acc: R::Acc) -> R::Acc {
        let acc = emit_all(&mut self.inner, acc, self.last_seen.take());
        self.inner.complete(acc)
    }
}

/// Comparison used by [`Ordering`] to sort items.
pub trait SortOrder<T> {
    /// Compares two items.
    fn compare(&mut self, a: &T, b: &T) -> std::cmp::Ordering;
}

/// Natural order of the items.
#[derive(Clone, Copy, Debug, Default)]
pub struct Natural;

impl<T: Ord> SortOrder<T> for Natural {
    fn compare(&mut self, a: &T, b: &T) -> std::cmp::Ordering {
        a.cmp(b)
    }
}

/// Order of the keys extracted from the items.
#[derive(Clone, Copy, Debug)]
pub struct ByKey<K>(K);

impl<T, K> SortOrder<T> for ByKey<K>
where
    K: KeyFn<T>,
    K::Key: Ord,
{
    fn compare(&mut self, a: &T, b: &T) -> std::cmp::Ordering {
        self.0.key(a).cmp(&self.0.key(b))
    }
}

/// Transducer returned by [`ordering()`] and [`ordering_by_key()`].
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Ordering<T, S> {
    order: S,
    reverse: bool,
    _phantom: PhantomData<fn(T) -> T>,
}

impl<T, S: Clone> Clone for Ordering<T, S> {
    fn clone(&self) -> Self {
        Self {
            order: self.order.clone(),
            reverse: self.reverse,
            _phantom: PhantomData,
        }
    }
}

/// Creates a transducer forwarding all the items in ascending order when the
/// reduction completes.
///
/// ```
/// # use transducer::prelude::*;
/// let sorted = transduce(ordering(), Appending, [3, 1, 2]);
/// assert_eq!(sorted, [1, 2, 3]);
///
/// let sorted = transduce(ordering().reversed(), Appending, [3, 1, 2]);
/// assert_eq!(sorted, [3, 2, 1]);
/// ```
pub fn ordering<T>() -> Ordering<T, Natural> {
    Ordering {
        order: Natural,
        reverse: false,
        _phantom: PhantomData,
    }
}

/// Creates a transducer forwarding all the items in ascending order of their
/// keys when the reduction completes.
///
/// Sorting is stable: items with equal keys keep their arrival order.
pub fn ordering_by_key<T, K>(key: K) -> Ordering<T, ByKey<K>> {
    Ordering {
        order: ByKey(key),
        reverse: false,
        _phantom: PhantomData,
    }
}

impl<T, S> Ordering<T, S> {
    /// Sorts in descending order instead. Items comparing equal still keep
    /// their arrival order.
    pub fn reversed(self) -> Self {
        Self {
            reverse: !self.reverse,
            ..self
        }
    }
}

/// Reducer produced by [`Ordering`].
pub struct OrderingReducer<T, S, R> {
    order: S,
    reverse: bool,
    items: Vec<T>,
    inner: R,
}

impl<T, S, R> Transducer<R> for Ordering<T, S> {
    type Reducer = OrderingReducer<T, S, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        OrderingReducer {
            order: self.order,
            reverse: self.reverse,
            items: Vec::new(),
            inner,
        }
    }
}

impl<T, S, R> Reducer<T> for OrderingReducer<T, S, R>
where
    S: SortOrder<T>,
    R: Reducer<T>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        self.items.push(item);
        ControlFlow::Continue(acc)
    }

    fn complete(mut self, acc: R::Acc) -> R::Acc {
        let mut items = std::mem::take(&mut self.items);
        let order = &mut self.order;
        if self.reverse {
            items.sort_by(|a, b| order.compare(a, b).reverse());
        } else {
            items.sort_by(|a, b| order.compare(a, b));
        }
        let acc = emit_all(&mut self.inner, acc, items);
        self.inner.complete(acc)
    }
}

/// Transducer returned by [`grouping()`] and [`grouping_by()`].
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Grouping<T, K> {
    key: K,
    _phantom: PhantomData<fn(T) -> T>,
}

impl<T, K: Clone> Clone for Grouping<T, K> {
    fn clone(&self) -> Self {
        grouping_by(self.key.clone())
    }
}

/// Creates a transducer grouping equal items together, and forwarding the
/// groups as a single map when the reduction completes.
pub fn grouping<T>() -> Grouping<T, Itself> {
    grouping_by(Itself)
}

/// Creates a transducer grouping items by key, and forwarding the groups as a
/// single map when the reduction completes.
///
/// Each group lists its items in arrival order.
///
/// ```
/// # use transducer::prelude::*;
/// # use std::collections::HashMap;
/// let groups = transduce(
///     grouping_by(|x: &i32| x % 2 == 0),
///     ExpectingSingle::new(),
///     [1, 2, 3, 4],
/// );
/// assert_eq!(
///     groups,
///     Some(HashMap::from([(false, vec![1, 3]), (true, vec![2, 4])]))
/// );
/// ```
pub fn grouping_by<T, K>(key: K) -> Grouping<T, K> {
    Grouping {
        key,
        _phantom: PhantomData,
    }
}

/// Reducer produced by [`Grouping`].
pub struct GroupingReducer<T, K: KeyFn<T>, R> {
    key: K,
    groups: HashMap<K::Key, Vec<T>>,
    inner: R,
}

impl<T, K, R> Transducer<R> for Grouping<T, K>
where
    K: KeyFn<T>,
{
    type Reducer = GroupingReducer<T, K, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        GroupingReducer {
            key: self.key,
            groups: HashMap::new(),
            inner,
        }
    }
}

impl<T, K, R> Reducer<T> for GroupingReducer<T, K, R>
where
    K: KeyFn<T>,
    K::Key: Eq + Hash,
    R: Reducer<HashMap<K::Key, Vec<T>>>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        let key = self.key.key(&item);
        self.groups.entry(key).or_default().push(item);
        ControlFlow::Continue(acc)
    }

    fn complete(mut self, acc: R::Acc) -> R::Acc {
        let groups = std::mem::take(&mut self.groups);
        let acc = emit_all(&mut self.inner, acc, [groups]);
        self.inner.complete(acc)
    }
}

/// Transducer returned by [`counting()`] and [`counting_where()`].
#[derive(Clone, Copy, Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Counting<P> {
    predicate: P,
}

/// Creates a transducer forwarding the number of items when the reduction
/// completes.
pub fn counting() -> Counting<Always> {
    counting_where(Always)
}

/// Creates a transducer forwarding the number of items that satisfy the
/// predicate when the reduction completes.
pub fn counting_where<P>(predicate: P) -> Counting<P> {
    Counting { predicate }
}

/// Reducer produced by [`Counting`].
pub struct CountingReducer<P, R> {
    predicate: P,
    count: usize,
    inner: R,
}

impl<P, R> Transducer<R> for Counting<P> {
    type Reducer = CountingReducer<P, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        CountingReducer {
            predicate: self.predicate,
            count: 0,
            inner,
        }
    }
}

impl<T, P, R> Reducer<T> for CountingReducer<P, R>
where
    P: Predicate<T>,
    R: Reducer<usize>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        if self.predicate.test(&item) {
            self.count += 1;
        }
        ControlFlow::Continue(acc)
    }

    fn complete(mut self, acc: R::Acc) -> R::Acc {
        let acc = emit_all(&mut self.inner, acc, [self.count]);
        self.inner.complete(acc)
    }
}

/// Transducer returned by [`reversing()`].
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Reversing<T> {
    _phantom: PhantomData<fn(T) -> T>,
}

impl<T> Clone for Reversing<T> {
    fn clone(&self) -> Self {
        reversing()
    }
}

/// Creates a transducer forwarding all the items in reverse order when the
/// reduction completes.
pub fn reversing<T>() -> Reversing<T> {
    Reversing {
        _phantom: PhantomData,
    }
}

/// Reducer produced by [`Reversing`].
pub struct ReversingReducer<T, R> {
    items: VecDeque<T>,
    inner: R,
}

impl<T, R> Transducer<R> for Reversing<T> {
    type Reducer = ReversingReducer<T, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        ReversingReducer {
            items: VecDeque::new(),
            inner,
        }
    }
}

impl<T, R: Reducer<T>> Reducer<T> for ReversingReducer<T, R> {
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        self.items.push_front(item);
        ControlFlow::Continue(acc)
    }

    fn complete(mut self, acc: R::Acc) -> R::Acc {
        let items = std::mem::take(&mut self.items);
        let acc = emit_all(&mut self.inner, acc, items);
        self.inner.complete(acc)
    }
}

/// Transducer returned by [`reducing()`] and [`reducing_from()`].
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Reducing<T, F> {
    f: F,
    seed: Option<T>,
}

impl<T: Clone, F: Clone> Clone for Reducing<T, F> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            seed: self.seed.clone(),
        }
    }
}

/// Creates a transducer folding all the items with `f`, starting from the
/// first item, and forwarding the folded value (if there was any item) when
/// the reduction completes.
///
/// ```
/// # use transducer::prelude::*;
/// let max = transduce(reducing(|a: u32, b: u32| a.max(b)), Appending, [3, 9, 2]);
/// assert_eq!(max, [9]);
/// ```
pub fn reducing<T, F>(f: F) -> Reducing<T, F> {
    Reducing { f, seed: None }
}

/// Creates a transducer folding all the items with `f`, starting from the
/// given seed, and forwarding the folded value when the reduction completes.
pub fn reducing_from<T, F>(seed: T, f: F) -> Reducing<T, F> {
    Reducing {
        f,
        seed: Some(seed),
    }
}

/// Reducer produced by [`Reducing`].
pub struct ReducingReducer<T, F, R> {
    f: F,
    accumulator: Option<T>,
    inner: R,
}

impl<T, F, R> Transducer<R> for Reducing<T, F> {
    type Reducer = ReducingReducer<T, F, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        ReducingReducer {
            f: self.f,
            accumulator: self.seed,
            inner,
        }
    }
}

impl<T, F, R> Reducer<T> for ReducingReducer<T, F, R>
where
    F: FnMut(T, T) -> T,
    R: Reducer<T>,
{
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        self.accumulator = Some(match self.accumulator.take() {
            None => item,
            Some(accumulator) => (self.f)(accumulator, item),
        });
        ControlFlow::Continue(acc)
    }

    fn complete(mut self, acc: R::Acc) -> R::Acc {
        let acc = emit_all(&mut self.inner, acc, self.accumulator.take());
        self.inner.complete(acc)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reducers::{Appending, ExpectingSingle};
    use crate::{compose, filtering, generate, mapping, taking, transduce};

    #[test]
    fn test_last() {
        let result = transduce(last(), ExpectingSingle::new(), [1, 2, 3]);
        assert_eq!(result, Some(3));
    }

    #[test]
    fn test_last_where() {
        let result = transduce(last_where(|x: &i32| x % 2 == 0), Appending, [1, 2, 3, 4, 5]);
        assert_eq!(result, [4]);

        let result = transduce(last_where(|x: &i32| *x > 5), Appending, [1, 2, 3]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_ordering_by_key() {
        let result = transduce(ordering_by_key(|x: &i32| -x), Appending, [3, 1, 2]);
        assert_eq!(result, [3, 2, 1]);
    }

    #[test]
    fn test_ordering_is_stable() {
        let items = [(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];
        let result = transduce(ordering_by_key(|x: &(i32, char)| x.0), Appending, items);
        assert_eq!(result, [(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c')]);

        let result = transduce(
            ordering_by_key(|x: &(i32, char)| x.0).reversed(),
            Appending,
            items,
        );
        assert_eq!(result, [(1, 'a'), (1, 'c'), (0, 'b'), (0, 'd')]);
    }

    #[test]
    fn test_ordering_lazy() {
        let result: Vec<i32> = generate(ordering(), [5, 3, 4]).collect();
        assert_eq!(result, [3, 4, 5]);
    }

    #[test]
    fn test_grouping_by_parity() {
        let result = transduce(
            grouping_by(|x: &i32| if x % 2 == 0 { "even" } else { "odd" }),
            ExpectingSingle::new(),
            [1, 2, 3, 4],
        );
        assert_eq!(
            result,
            Some(HashMap::from([("odd", vec![1, 3]), ("even", vec![2, 4])]))
        );
    }

    #[test]
    fn test_grouping_identity() {
        let result = transduce(grouping(), ExpectingSingle::new(), ['a', 'b', 'a']);
        assert_eq!(
            result,
            Some(HashMap::from([('a', vec!['a', 'a']), ('b', vec!['b'])]))
        );
    }

    #[test]
    fn test_grouping_empty_source() {
        let result = transduce(grouping(), ExpectingSingle::new(), Vec::<u8>::new());
        assert_eq!(result, Some(HashMap::new()));
    }

    #[test]
    fn test_counting() {
        let result = transduce(counting(), ExpectingSingle::new(), "hello".chars());
        assert_eq!(result, Some(5));

        let result = transduce(
            counting_where(|c: &char| "aeiou".contains(*c)),
            ExpectingSingle::new(),
            "hello".chars(),
        );
        assert_eq!(result, Some(2));
    }

    #[test]
    fn test_reversing() {
        let result = transduce(reversing(), Appending, [1, 2, 3]);
        assert_eq!(result, [3, 2, 1]);
    }

    #[test]
    fn test_reversing_then_taking() {
        // Deferred emissions honor the early-termination signal of the
        // downstream stages.
        let result = transduce(compose!(reversing(), taking(2)), Appending, 1..=5);
        assert_eq!(result, [5, 4]);
    }

    #[test]
    fn test_reducing() {
        let result = transduce(reducing(|a: i32, b: i32| a * b), Appending, 1..=5);
        assert_eq!(result, [120]);

        let result = transduce(reducing(|a: i32, b: i32| a * b), Appending, Vec::<i32>::new());
        assert!(result.is_empty());

        let result = transduce(
            reducing_from(10, |a: i32, b: i32| a + b),
            Appending,
            Vec::<i32>::new(),
        );
        assert_eq!(result, [10]);
    }

    #[test]
    fn test_aggregates_in_pipeline() {
        let result = transduce(
            compose!(
                filtering(|x: &u32| x % 3 == 0),
                ordering().reversed(),
                mapping(|x: u32| x * 2),
            ),
            Appending,
            [9, 1, 3, 6, 4],
        );
        assert_eq!(result, [18, 12, 6]);
    }

    #[test]
    fn test_aggregates_do_not_combine() {
        let reducer = counting().apply(Appending);
        assert_eq!(Reducer::<i32>::combine(&reducer, vec![1], vec![2]), None);

        let reducer = reversing::<i32>().apply(Appending);
        assert_eq!(reducer.combine(vec![1], vec![2]), None);
    }
}

// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Terminal reducers.
//!
//! These reducers are stateless unit structs (except [`Completing`] and
//! [`ExpectingSingle`]) and can be freely copied between reductions.

use crate::{Reducer, Step};
use std::collections::HashSet;
use std::hash::Hash;
use std::ops::ControlFlow;

/// Appends items to a [`Vec`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Appending;

impl<T> Reducer<T> for Appending {
    type Acc = Vec<T>;

    fn initial(&self) -> Vec<T> {
        Vec::new()
    }

    fn step(&mut self, mut acc: Vec<T>, item: T) -> Step<Vec<T>> {
        acc.push(item);
        ControlFlow::Continue(acc)
    }

    fn combine(&self, mut left: Vec<T>, mut right: Vec<T>) -> Option<Vec<T>> {
        left.append(&mut right);
        Some(left)
    }
}

/// Extends a [`Vec`] with each item, which must itself be iterable.
#[derive(Clone, Copy, Debug, Default)]
pub struct Extending;

impl<I: IntoIterator> Reducer<I> for Extending {
    type Acc = Vec<I::Item>;

    fn initial(&self) -> Vec<I::Item> {
        Vec::new()
    }

    fn step(&mut self, mut acc: Vec<I::Item>, item: I) -> Step<Vec<I::Item>> {
        acc.extend(item);
        ControlFlow::Continue(acc)
    }

    fn combine(&self, mut left: Vec<I::Item>, mut right: Vec<I::Item>) -> Option<Vec<I::Item>> {
        left.append(&mut right);
        Some(left)
    }
}

/// Concatenates string-like items into a [`String`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Concatenating;

impl<S: AsRef<str>> Reducer<S> for Concatenating {
    type Acc = String;

    fn initial(&self) -> String {
        String::new()
    }

    fn step(&mut self, mut acc: String, item: S) -> Step<String> {
        acc.push_str(item.as_ref());
        ControlFlow::Continue(acc)
    }

    fn combine(&self, mut left: String, right: String) -> Option<String> {
        left.push_str(&right);
        Some(left)
    }
}

/// Inserts items into a [`HashSet`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Adding;

impl<T: Eq + Hash> Reducer<T> for Adding {
    type Acc = HashSet<T>;

    fn initial(&self) -> HashSet<T> {
        HashSet::new()
    }

    fn step(&mut self, mut acc: HashSet<T>, item: T) -> Step<HashSet<T>> {
        acc.insert(item);
        ControlFlow::Continue(acc)
    }

    fn combine(&self, mut left: HashSet<T>, right: HashSet<T>) -> Option<HashSet<T>> {
        left.extend(right);
        Some(left)
    }
}

/// Expects exactly one item, and returns it.
///
/// Receiving a second item, or completing without having received any, is a
/// bug in the pipeline and panics.
#[derive(Debug, Default)]
pub struct ExpectingSingle {
    num_steps: usize,
}

impl ExpectingSingle {
    /// Creates a reducer expecting a single item.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> Reducer<T> for ExpectingSingle {
    type Acc = Option<T>;

    fn initial(&self) -> Option<T> {
        None
    }

    fn step(&mut self, acc: Option<T>, item: T) -> Step<Option<T>> {
        self.num_steps += 1;
        assert!(self.num_steps == 1, "Too many steps!");
        assert!(acc.is_none(), "Expected an empty seed");
        ControlFlow::Continue(Some(item))
    }

    fn complete(self, acc: Option<T>) -> Option<T> {
        assert!(self.num_steps == 1, "Too few steps!");
        acc
    }
}

/// Reducer built from a plain folding function, see [`completing()`].
#[derive(Clone, Copy, Debug)]
pub struct Completing<A, F, C = fn(A, A) -> A> {
    identity: A,
    fold: F,
    combiner: Option<C>,
}

/// Completes a plain folding function into a [`Reducer`], whose seed is the
/// given identity value.
///
/// The resulting reducer cannot combine partial results, unless a combiner is
/// attached with [`combining()`](Completing::combining).
///
/// ```
/// # use transducer::prelude::*;
/// let sum = transduce(Identity, completing(0, |acc: u64, x: u64| acc + x), 1..=10);
/// assert_eq!(sum, 55);
/// ```
pub fn completing<A, F>(identity: A, fold: F) -> Completing<A, F> {
    Completing {
        identity,
        fold,
        combiner: None,
    }
}

impl<A, F, C> Completing<A, F, C> {
    /// Attaches a function to combine partial results, which must be
    /// associative and admit the identity value as neutral element.
    pub fn combining<C2>(self, combiner: C2) -> Completing<A, F, C2>
    where
        C2: Fn(A, A) -> A,
    {
        Completing {
            identity: self.identity,
            fold: self.fold,
            combiner: Some(combiner),
        }
    }
}

impl<T, A, F, C> Reducer<T> for Completing<A, F, C>
where
    A: Clone,
    F: FnMut(A, T) -> A,
    C: Fn(A, A) -> A,
{
    type Acc = A;

    fn initial(&self) -> A {
        self.identity.clone()
    }

    fn step(&mut self, acc: A, item: T) -> Step<A> {
        ControlFlow::Continue((self.fold)(acc, item))
    }

    fn combine(&self, left: A, right: A) -> Option<A> {
        self.combiner.as_ref().map(|combiner| combiner(left, right))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{transduce, Identity};

    #[test]
    fn appending() {
        let result = transduce(Identity, Appending, [1, 2, 3]);
        assert_eq!(result, [1, 2, 3]);
        assert_eq!(
            Reducer::<i32>::combine(&Appending, vec![1, 2], vec![3]),
            Some(vec![1, 2, 3])
        );
    }

    #[test]
    fn extending() {
        let result = transduce(Identity, Extending, [vec![1, 2], vec![], vec![3]]);
        assert_eq!(result, [1, 2, 3]);
    }

    #[test]
    fn concatenating() {
        let result = transduce(Identity, Concatenating, ["ab", "", "cd"]);
        assert_eq!(result, "abcd");
        assert_eq!(
            Reducer::<&str>::combine(&Concatenating, "ab".to_owned(), "cd".to_owned()),
            Some("abcd".to_owned())
        );
    }

    #[test]
    fn adding() {
        let result = transduce(Identity, Adding, [3, 1, 3, 2, 1]);
        assert_eq!(result, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn expecting_single() {
        let result = transduce(Identity, ExpectingSingle::new(), [42]);
        assert_eq!(result, Some(42));
    }

    #[test]
    #[should_panic(expected = "Too many steps!")]
    fn expecting_single_too_many() {
        transduce(Identity, ExpectingSingle::new(), [1, 2]);
    }

    #[test]
    #[should_panic(expected = "Too few steps!")]
    fn expecting_single_too_few() {
        transduce(Identity, ExpectingSingle::new(), Vec::<i32>::new());
    }

    #[test]
    fn completing_without_combiner() {
        let reducer = completing(1u64, |acc: u64, x: u64| acc * x);
        assert_eq!(Reducer::<u64>::combine(&reducer, 2, 3), None);
        assert_eq!(transduce(Identity, reducer, 1..=5), 120);
    }

    #[test]
    fn completing_with_combiner() {
        let reducer = completing(0u64, |acc: u64, x: u64| acc + x).combining(|a, b| a + b);
        assert_eq!(Reducer::<u64>::combine(&reducer, 2, 3), Some(5));
        assert_eq!(Reducer::<u64>::initial(&reducer), 0);
    }
}

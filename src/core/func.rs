// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Function-like parameters of the stages, with their defaults.

/// A predicate over items.
///
/// This is implemented by any `FnMut(&T) -> bool` closure, and by [`Always`].
pub trait Predicate<T> {
    /// Evaluates the predicate on the given item.
    fn test(&mut self, item: &T) -> bool;
}

impl<T, F> Predicate<T> for F
where
    F: FnMut(&T) -> bool,
{
    fn test(&mut self, item: &T) -> bool {
        self(item)
    }
}

/// The predicate that holds for every item.
#[derive(Clone, Copy, Debug, Default)]
pub struct Always;

impl<T> Predicate<T> for Always {
    fn test(&mut self, _item: &T) -> bool {
        true
    }
}

/// A function extracting a key from an item.
///
/// This is implemented by any `FnMut(&T) -> K` closure, and by [`Itself`].
pub trait KeyFn<T> {
    /// Type of the extracted key.
    type Key;

    /// Extracts the key of the given item.
    fn key(&mut self, item: &T) -> Self::Key;
}

impl<T, K, F> KeyFn<T> for F
where
    F: FnMut(&T) -> K,
{
    type Key = K;

    fn key(&mut self, item: &T) -> K {
        self(item)
    }
}

/// The key function returning (a copy of) the item itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct Itself;

impl<T: Clone> KeyFn<T> for Itself {
    type Key = T;

    fn key(&mut self, item: &T) -> T {
        item.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn closures_are_predicates() {
        let mut even = |x: &i32| x % 2 == 0;
        assert!(Predicate::test(&mut even, &2));
        assert!(!Predicate::test(&mut even, &3));
    }

    #[test]
    fn always_holds() {
        assert!(Predicate::<i32>::test(&mut Always, &0));
        assert!(Predicate::<&str>::test(&mut Always, &""));
    }

    #[test]
    fn key_functions() {
        let mut parity = |x: &i32| x % 2;
        assert_eq!(KeyFn::key(&mut parity, &7), 1);
        assert_eq!(KeyFn::<String>::key(&mut Itself, &"abc".to_owned()), "abc");
    }
}

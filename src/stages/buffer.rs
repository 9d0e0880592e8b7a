// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stages grouping consecutive items.

use crate::error::{Error, Result};
use crate::{Reducer, Step, Transducer};
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::ops::ControlFlow;

/// Transducer returned by [`batching()`].
#[derive(Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Batching<T> {
    size: NonZeroUsize,
    _phantom: PhantomData<fn(T) -> T>,
}

impl<T> Clone for Batching<T> {
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            _phantom: PhantomData,
        }
    }
}

/// Creates a transducer forwarding non-overlapping batches of `size`
/// consecutive items.
///
/// The last batch may be shorter: it is forwarded when the reduction
/// completes. Fails if `size` is zero.
///
/// ```
/// # use transducer::prelude::*;
/// let batches = transduce(batching(3)?, Appending, 1..=7);
/// assert_eq!(batches, [vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
/// # Ok::<(), transducer::Error>(())
/// ```
pub fn batching<T>(size: usize) -> Result<Batching<T>> {
    let size = NonZeroUsize::new(size).ok_or(Error::InvalidStageConfig {
        stage: "batching",
        reason: "size must be at least 1",
    })?;
    Ok(Batching {
        size,
        _phantom: PhantomData,
    })
}

/// Reducer produced by [`Batching`].
pub struct BatchingReducer<T, R> {
    size: usize,
    pending: Vec<T>,
    terminated: bool,
    inner: R,
}

impl<T, R> Transducer<R> for Batching<T> {
    type Reducer = BatchingReducer<T, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        let size = self.size.get();
        BatchingReducer {
            size,
            pending: Vec::with_capacity(size),
            terminated: false,
            inner,
        }
    }
}

impl<T, R: Reducer<Vec<T>>> Reducer<T> for BatchingReducer<T, R> {
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        if self.terminated {
            return ControlFlow::Break(acc);
        }
        self.pending.push(item);
        if self.pending.len() == self.size {
            let batch = std::mem::replace(&mut self.pending, Vec::with_capacity(self.size));
            let step = self.inner.step(acc, batch);
            self.terminated = step.is_break();
            step
        } else {
            ControlFlow::Continue(acc)
        }
    }

    fn complete(mut self, mut acc: R::Acc) -> R::Acc {
        // The inner reducer doesn't accept any item after terminating.
        if !self.terminated && !self.pending.is_empty() {
            let batch = std::mem::take(&mut self.pending);
            acc = match self.inner.step(acc, batch) {
                ControlFlow::Continue(acc) | ControlFlow::Break(acc) => acc,
            };
        }
        self.inner.complete(acc)
    }
}

/// Transducer returned by [`windowing()`] and [`windowing_padded()`].
#[derive(Clone, Debug)]
#[must_use = "transducers do nothing unless applied to a reducer"]
pub struct Windowing<T> {
    size: NonZeroUsize,
    padding: Option<T>,
}

/// Creates a transducer forwarding a sliding window over the last `size`
/// items, after each item.
///
/// The first windows are shorter, until `size` items have been seen. Fails if
/// `size` is zero.
///
/// ```
/// # use transducer::prelude::*;
/// let windows = transduce(windowing(2)?, Appending, 1..=3);
/// assert_eq!(windows, [vec![1], vec![1, 2], vec![2, 3]]);
/// # Ok::<(), transducer::Error>(())
/// ```
pub fn windowing<T>(size: usize) -> Result<Windowing<T>> {
    Ok(Windowing {
        size: window_size(size)?,
        padding: None,
    })
}

/// Creates a transducer forwarding a sliding window over the last `size`
/// items, after each item.
///
/// The window initially contains `size` copies of the padding. When the
/// reduction completes, `size - 1` more copies of the padding are pushed, each
/// producing one more window, so that the last item slides all the way to the
/// front. Fails if `size` is zero.
///
/// ```
/// # use transducer::prelude::*;
/// let windows = transduce(windowing_padded(3, 0)?, Appending, 1..=3);
/// assert_eq!(
///     windows,
///     [
///         vec![0, 0, 1],
///         vec![0, 1, 2],
///         vec![1, 2, 3],
///         vec![2, 3, 0],
///         vec![3, 0, 0],
///     ]
/// );
/// # Ok::<(), transducer::Error>(())
/// ```
pub fn windowing_padded<T>(size: usize, padding: T) -> Result<Windowing<T>> {
    Ok(Windowing {
        size: window_size(size)?,
        padding: Some(padding),
    })
}

fn window_size(size: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(size).ok_or(Error::InvalidStageConfig {
        stage: "windowing",
        reason: "size must be at least 1",
    })
}

/// Reducer produced by [`Windowing`].
pub struct WindowingReducer<T, R> {
    size: usize,
    padding: Option<T>,
    window: VecDeque<T>,
    terminated: bool,
    inner: R,
}

impl<T: Clone, R> Transducer<R> for Windowing<T> {
    type Reducer = WindowingReducer<T, R>;

    fn apply(self, inner: R) -> Self::Reducer {
        let size = self.size.get();
        let mut window = VecDeque::with_capacity(size);
        if let Some(padding) = &self.padding {
            window.extend(std::iter::repeat(padding).take(size).cloned());
        }
        WindowingReducer {
            size,
            padding: self.padding,
            window,
            terminated: false,
            inner,
        }
    }
}

impl<T: Clone, R> WindowingReducer<T, R> {
    /// Slides the window by one item, and returns a snapshot of it.
    fn push(&mut self, item: T) -> Vec<T> {
        if self.window.len() == self.size {
            self.window.pop_front();
        }
        self.window.push_back(item);
        self.window.iter().cloned().collect()
    }
}

impl<T: Clone, R: Reducer<Vec<T>>> Reducer<T> for WindowingReducer<T, R> {
    type Acc = R::Acc;

    fn initial(&self) -> R::Acc {
        self.inner.initial()
    }

    fn step(&mut self, acc: R::Acc, item: T) -> Step<R::Acc> {
        if self.terminated {
            return ControlFlow::Break(acc);
        }
        let window = self.push(item);
        let step = self.inner.step(acc, window);
        self.terminated = step.is_break();
        step
    }

    fn complete(mut self, mut acc: R::Acc) -> R::Acc {
        let padding = if self.terminated {
            None
        } else {
            self.padding.take()
        };
        if let Some(padding) = padding {
            for _ in 1..self.size {
                let window = self.push(padding.clone());
                match self.inner.step(acc, window) {
                    ControlFlow::Continue(next) => acc = next,
                    ControlFlow::Break(last) => {
                        acc = last;
                        break;
                    }
                }
            }
        }
        self.inner.complete(acc)
    }
}

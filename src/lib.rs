// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![doc = include_str!("../README.md")]
#![forbid(missing_docs, unsafe_code)]

mod macros;

mod core;
mod error;
pub mod parallel;
pub mod reducers;
pub mod stages;
pub mod threads;

pub use crate::core::{
    compose, generate, transduce, transduce_from, Always, Compose, Generate, Identity, Itself,
    KeyFn, Pending, Predicate, Reducer, Step, Transducer,
};
pub use error::{Error, Result};
pub use parallel::{
    geometric_partitioning, transduce_parallel, GeometricPartitioning, ParallelTransduce,
};
pub use reducers::{
    completing, Adding, Appending, Completing, Concatenating, ExpectingSingle, Extending,
};
pub use stages::{
    batching, counting, counting_where, distinct, dropping_while, enumerating, filtering, first,
    first_where, grouping, grouping_by, last, last_where, mapcatting, mapping, ordering,
    ordering_by_key, pairwise, reducing, reducing_from, reversing, taking, windowing,
    windowing_padded,
};
#[cfg(feature = "rayon")]
pub use threads::RayonExecutor;
pub use threads::{
    CpuPinningPolicy, ExecutorBuilder, ParallelExecutor, ScopedExecutor, Sequential, ThreadCount,
};

/// A prelude, re-exporting the drivers, stages, reducers and executors.
pub mod prelude {
    pub use crate::compose;
    pub use crate::core::{
        generate, transduce, transduce_from, Identity, Reducer, Step, Transducer,
    };
    pub use crate::error::{Error, Result};
    pub use crate::parallel::{transduce_parallel, GeometricPartitioning, ParallelTransduce};
    pub use crate::reducers::{
        completing, Adding, Appending, Concatenating, ExpectingSingle, Extending,
    };
    pub use crate::stages::{
        batching, counting, counting_where, distinct, dropping_while, enumerating, filtering,
        first, first_where, grouping, grouping_by, last, last_where, mapcatting, mapping,
        ordering, ordering_by_key, pairwise, reducing, reducing_from, reversing, taking,
        windowing, windowing_padded,
    };
    #[cfg(feature = "rayon")]
    pub use crate::threads::RayonExecutor;
    pub use crate::threads::{
        CpuPinningPolicy, ExecutorBuilder, ParallelExecutor, Sequential, ThreadCount,
    };
}

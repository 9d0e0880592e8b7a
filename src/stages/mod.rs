// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Library of transducer stages.
//!
//! Each stage comes as a constructor function returning a transducer, i.e. the
//! configuration of the stage. Applying it to a reducer creates a fresh
//! stateful reducer, so the same configuration can be cloned and reused across
//! reductions.

mod aggregate;
mod buffer;
mod element;
mod prefix;

pub use aggregate::{
    counting, counting_where, grouping, grouping_by, last, last_where, ordering, ordering_by_key,
    reducing, reducing_from, reversing, ByKey, Counting, CountingReducer, Grouping,
    GroupingReducer, Last, LastReducer, Natural, Ordering, OrderingReducer, Reducing,
    ReducingReducer, Reversing, ReversingReducer, SortOrder,
};
pub use buffer::{
    batching, windowing, windowing_padded, Batching, BatchingReducer, Windowing, WindowingReducer,
};
pub use element::{
    distinct, enumerating, filtering, mapcatting, mapping, pairwise, Distinct, DistinctReducer,
    Enumerating, EnumeratingReducer, Filtering, FilteringReducer, Mapcatting, MapcattingReducer,
    Mapping, MappingReducer, Pairwise, PairwiseReducer,
};
pub use prefix::{
    dropping_while, first, first_where, taking, DroppingWhile, DroppingWhileReducer, First,
    FirstReducer, Taking, TakingReducer,
};

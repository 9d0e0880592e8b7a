// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Core protocols and drivers.

pub(crate) mod driver;
mod func;
mod reducer;

pub use driver::{generate, transduce, transduce_from, Generate, Pending};
pub use func::{Always, Itself, KeyFn, Predicate};
pub use reducer::{compose, Compose, Identity, Reducer, Step, Transducer};

// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types.

use thiserror::Error;

/// Errors reported when building or running a reduction.
///
/// Early termination of a reduction is not an error: it is reported through
/// [`Step`](crate::Step).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A stage was configured with invalid parameters.
    #[error("{stage}() {reason}")]
    InvalidStageConfig {
        /// Name of the stage constructor.
        stage: &'static str,
        /// What is wrong with the parameters.
        reason: &'static str,
    },

    /// Parallel reduction was requested with a reducer that cannot combine
    /// partial results.
    #[error("transducer(reducer) is not associative and cannot be parallelized")]
    NotCombinable,

    /// A worker panicked while reducing a partition.
    ///
    /// Only string payloads (as produced by `panic!` with a message) are
    /// preserved. Any other payload is dropped and replaced by a placeholder
    /// message, so that this error stays cloneable and comparable.
    #[error("worker reducing partition #{partition} panicked: {message}")]
    WorkerPanicked {
        /// Index of the partition that the worker was reducing.
        partition: usize,
        /// Panic message, or `"<non-string panic payload>"` if the panic
        /// payload wasn't a string.
        message: String,
    },
}

/// Result type of this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds a [`WorkerPanicked`](Error::WorkerPanicked) error out of a panic
    /// payload.
    pub(crate) fn from_panic(partition: usize, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_owned()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "<non-string panic payload>".to_owned()
        };
        Error::WorkerPanicked { partition, message }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Error::InvalidStageConfig {
                stage: "batching",
                reason: "size must be at least 1",
            }
            .to_string(),
            "batching() size must be at least 1"
        );
        assert_eq!(
            Error::NotCombinable.to_string(),
            "transducer(reducer) is not associative and cannot be parallelized"
        );
        assert_eq!(
            Error::WorkerPanicked {
                partition: 3,
                message: "boom".to_owned(),
            }
            .to_string(),
            "worker reducing partition #3 panicked: boom"
        );
    }

    #[test]
    fn from_panic_payloads() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(
            Error::from_panic(0, payload.as_ref()),
            Error::WorkerPanicked {
                partition: 0,
                message: "static message".to_owned(),
            }
        );

        let payload: Box<dyn std::any::Any + Send> = Box::new(format!("formatted {}", 42));
        assert_eq!(
            Error::from_panic(1, payload.as_ref()),
            Error::WorkerPanicked {
                partition: 1,
                message: "formatted 42".to_owned(),
            }
        );

        let payload: Box<dyn std::any::Any + Send> = Box::new(42);
        assert_eq!(
            Error::from_panic(2, payload.as_ref()),
            Error::WorkerPanicked {
                partition: 2,
                message: "<non-string panic payload>".to_owned(),
            }
        );
    }
}

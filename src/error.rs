// Copyright 2022 houseme
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use chrono::{DateTime, Utc};
use std::error::Error as StdError;
use thiserror::Error;

/// Convenience type alias for fallible worker tag providers.
pub type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// The error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("start_time `{0}` is ahead of current time")]
    StartTimeAheadOfCurrentTime(DateTime<Utc>),
    #[error("worker_tag returned an error: {0}")]
    WorkerTagFailed(#[source] BoxDynError),
    #[error("check_worker_tag returned false")]
    CheckWorkerTagFailed,
    #[error("worker tag {tag} is greater than the max allowed value {max}")]
    InvalidWorkerTag { tag: u16, max: u16 },
    #[error("could not find any private ip address to derive a worker tag from")]
    NoPrivateAddress,
    #[error("clock moved backwards by {delta_ms}ms")]
    ClockRegression { delta_ms: i64 },
    #[error("over the time limit")]
    OverTimeLimit,
    #[error("mutex is poisoned (i.e. a panic happened while it was locked)")]
    MutexPoisoned,
    #[error("malformed identifier `{input}`: {reason}")]
    MalformedIdentifier { input: String, reason: &'static str },
}

/// An error returned by [`IdGenerator::take`], tagged with the identity of
/// the generator that failed.
///
/// The underlying [`Error`] is kept as is in `source`.
///
/// [`IdGenerator::take`]: crate::IdGenerator::take
#[derive(Error, Debug)]
#[error("generator `{prefix}` (worker tag {worker_tag}): {source}")]
pub struct TakeError {
    pub prefix: String,
    pub worker_tag: u16,
    #[source]
    pub source: Error,
}

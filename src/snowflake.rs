use crate::builder::Builder;
use crate::error::*;
use crate::time::{SystemClock, TimeSource};
use std::{
    sync::{Arc, Mutex},
    thread,
};

/// bit length of time
pub const BIT_LEN_TIME: u32 = 41;
/// bit length of the worker tag
pub const BIT_LEN_WORKER_TAG: u32 = 10;
/// bit length of sequence number
pub const BIT_LEN_SEQUENCE: u32 = 63 - BIT_LEN_TIME - BIT_LEN_WORKER_TAG;
/// largest worker tag that fits the layout
pub const MAX_WORKER_TAG: u16 = (1 << BIT_LEN_WORKER_TAG) - 1;
/// largest sequence number within one millisecond
pub(crate) const MAX_SEQUENCE: u16 = (1 << BIT_LEN_SEQUENCE) - 1;
/// first elapsed time that no longer fits the layout
pub(crate) const TIME_LIMIT: i64 = 1 << BIT_LEN_TIME;

/// Internals of Snowflake.
/// This struct is not exposed to the public.
#[derive(Debug)]
pub(crate) struct Internals {
    /// milliseconds since the epoch of the last issued id, -1 before the first
    pub(crate) elapsed_time: i64,
    pub(crate) sequence: u16,
}

/// SharedSnowflake is shared between Snowflake instances.
/// This struct is not exposed to the public.
pub(crate) struct SharedSnowflake<T> {
    /// epoch in milliseconds since the Unix epoch
    pub(crate) start_time: i64,
    pub(crate) worker_tag: u16,
    pub(crate) clock: T,
    pub(crate) internals: Mutex<Internals>,
}

/// Snowflake is a distributed unique ID generator.
/// It is thread-safe and can be cloned to be used in multiple threads.
///
/// Every id is laid out as
///
/// ```text
/// | 1 bit: 0 | 41 bits: ms since epoch | 10 bits: worker tag | 12 bits: sequence |
/// ```
pub struct Snowflake<T = SystemClock>(pub(crate) Arc<SharedSnowflake<T>>);

impl Snowflake {
    /// Create a new Snowflake with the default configuration.
    /// For custom configuration see [`builder`].
    ///
    /// [`builder`]: struct.Snowflake.html#method.builder
    pub fn new() -> Result<Self, Error> {
        Builder::new().finalize()
    }

    /// Create a new [`Builder`] to construct a Snowflake.
    ///
    /// [`Builder`]: struct.Builder.html
    pub fn builder<'a>() -> Builder<'a> {
        Builder::new()
    }
}

impl<T: TimeSource> Snowflake<T> {
    pub(crate) fn new_inner(shared: Arc<SharedSnowflake<T>>) -> Self {
        Self(shared)
    }

    /// The worker tag encoded into every id of this generator.
    pub fn worker_tag(&self) -> u16 {
        self.0.worker_tag
    }

    /// The epoch, in milliseconds since the Unix epoch.
    pub fn start_time(&self) -> i64 {
        self.0.start_time
    }

    /// Generate the next unique id.
    ///
    /// Ids from one generator are strictly increasing. When the 4096 ids of
    /// a millisecond are used up, the call blocks until the clock reaches the
    /// next millisecond.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   issued id. Nothing is recorded, so a later call succeeds once the
    ///   clock catches up.
    /// - [`Error::OverTimeLimit`] once 41 bits of milliseconds are exhausted.
    /// - [`Error::MutexPoisoned`] if another caller panicked mid-call.
    pub fn next_id(&self) -> Result<i64, Error> {
        let mut exhausted = false;
        let id = self.next_id_locked(&mut exhausted);
        if exhausted {
            tracing::trace!(
                worker_tag = self.0.worker_tag,
                "sequence exhausted, waited for next millisecond"
            );
        }
        id
    }

    /// Runs the critical section. `exhausted` is set when the call had to
    /// wait for the clock, so the caller can report it after unlocking.
    fn next_id_locked(&self, exhausted: &mut bool) -> Result<i64, Error> {
        let mut internals = self.0.internals.lock().map_err(|_| Error::MutexPoisoned)?;

        // before the first id `elapsed_time` is -1; the clock must not read
        // earlier than the epoch either way
        let floor = internals.elapsed_time.max(0);
        let current = self.current_elapsed_time();
        if current < floor {
            return Err(Error::ClockRegression {
                delta_ms: floor - current,
            });
        }

        let (elapsed_time, sequence) = if current > internals.elapsed_time {
            (current, 0)
        } else if internals.sequence < MAX_SEQUENCE {
            (current, internals.sequence + 1)
        } else {
            *exhausted = true;
            (self.wait_next_millis(current)?, 0)
        };

        if elapsed_time >= TIME_LIMIT {
            return Err(Error::OverTimeLimit);
        }

        internals.elapsed_time = elapsed_time;
        internals.sequence = sequence;

        Ok(elapsed_time << (BIT_LEN_WORKER_TAG + BIT_LEN_SEQUENCE)
            | i64::from(self.0.worker_tag) << BIT_LEN_SEQUENCE
            | i64::from(sequence))
    }

    /// Returns the milliseconds elapsed since the epoch.
    fn current_elapsed_time(&self) -> i64 {
        self.0.clock.current_millis() - self.0.start_time
    }

    /// Blocks until the clock moves past `last`, returning the new elapsed time.
    fn wait_next_millis(&self, last: i64) -> Result<i64, Error> {
        loop {
            let current = self.current_elapsed_time();
            if current > last {
                return Ok(current);
            }
            if current < last {
                return Err(Error::ClockRegression {
                    delta_ms: last - current,
                });
            }
            thread::yield_now();
        }
    }
}

/// Returns a new `Snowflake` referencing the same state as `self`.
/// This is used for concurrent use.
impl<T> Clone for Snowflake<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// The generator reads it once per ID (and repeatedly while waiting for the
/// next millisecond), so implementations should be cheap. Swap in your own
/// to control time in tests:
///
/// ```
/// use snowflake_idgen::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> i64 {
///         1_700_000_000_000
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1_700_000_000_000);
/// ```
pub trait TimeSource: Send + Sync {
    /// Returns the current time in milliseconds since 1970-01-01T00:00:00Z.
    fn current_millis(&self) -> i64;
}

/// The system wall clock, read through `chrono`.
///
/// Unlike a monotonic timer this clock follows NTP corrections, which is
/// what makes [`Error::ClockRegression`] observable.
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> i64 {
        (**self).current_millis()
    }
}

/// Default epoch: 2022-01-01T00:00:00Z, in milliseconds since the Unix epoch.
pub const DEFAULT_EPOCH_MILLIS: i64 = 1_640_995_200_000;

/// Returns the default epoch as a `DateTime<Utc>`.
pub fn default_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(DEFAULT_EPOCH_MILLIS).unwrap_or_default()
}

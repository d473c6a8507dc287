use crate::builder::Builder;
use crate::codec;
use crate::error::{Error, TakeError};
use crate::snowflake::Snowflake;
use crate::time::{SystemClock, TimeSource};

/// IdGenerator hands out prefixed, time-sortable identifiers.
///
/// Every identifier is `prefix` followed by 16 lowercase hex characters, so
/// identifiers of one generator compare as strings in the order they were
/// taken. Clones share the same underlying [`Snowflake`].
pub struct IdGenerator<T = SystemClock> {
    prefix: String,
    worker: Snowflake<T>,
}

impl IdGenerator {
    /// Create a generator with the default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the generator cannot be configured, e.g. when no worker tag
    /// can be derived from the host. Use [`try_with_builder`] to handle that
    /// case yourself.
    ///
    /// [`try_with_builder`]: IdGenerator::try_with_builder
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_builder(prefix, Builder::new())
    }
}

impl<T: TimeSource> IdGenerator<T> {
    /// Create a generator configured by `builder`.
    ///
    /// # Panics
    ///
    /// Panics if `builder` fails to finalize. A bad configuration is a
    /// startup error and is not worth retrying.
    pub fn with_builder(prefix: impl Into<String>, builder: Builder<'_, T>) -> Self {
        match Self::try_with_builder(prefix, builder) {
            Ok(generator) => generator,
            Err(err) => panic!("IdGenerator: unexpected error {err}"),
        }
    }

    /// Create a generator configured by `builder`, returning configuration
    /// errors instead of panicking.
    pub fn try_with_builder(
        prefix: impl Into<String>,
        builder: Builder<'_, T>,
    ) -> Result<Self, Error> {
        Ok(Self {
            prefix: prefix.into(),
            worker: builder.finalize()?,
        })
    }

    /// Returns a new unique identifier formatted as `prefix` + 16 hex characters.
    ///
    /// Errors from the underlying [`Snowflake`] are returned unchanged inside
    /// a [`TakeError`]; nothing is retried.
    pub fn take(&self) -> Result<String, TakeError> {
        match self.worker.next_id() {
            Ok(id) => Ok(codec::encode_with_prefix(&self.prefix, id)),
            Err(source) => {
                tracing::warn!(
                    prefix = %self.prefix,
                    worker_tag = self.worker.worker_tag(),
                    error = %source,
                    "IdGenerator: take new id from worker failed"
                );
                Err(TakeError {
                    prefix: self.prefix.clone(),
                    worker_tag: self.worker.worker_tag(),
                    source,
                })
            }
        }
    }

    /// Recovers the raw id from an identifier taken from this generator.
    pub fn parse(&self, id: &str) -> Result<i64, Error> {
        match id.strip_prefix(self.prefix.as_str()) {
            Some(encoded) => codec::decode(encoded),
            None => Err(Error::MalformedIdentifier {
                input: id.to_owned(),
                reason: "missing generator prefix",
            }),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn worker_tag(&self) -> u16 {
        self.worker.worker_tag()
    }
}

impl<T> Clone for IdGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            worker: self.worker.clone(),
        }
    }
}

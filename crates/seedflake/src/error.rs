use core::fmt;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The field that failed validation in an [`Error::InvalidField`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Field {
    /// Milliseconds since the epoch.
    Timestamp,
    /// The worker/process discriminator.
    WorkerId,
    /// The randomized seed discriminator.
    Seed,
    /// The per-millisecond sequence counter.
    Sequence,
    /// The combined low bits of a [`BitLayout`](crate::BitLayout).
    Layout,
    /// A bit count passed to [`random_in_range`](crate::random_in_range).
    Bits,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timestamp => "timestamp",
            Self::WorkerId => "worker_id",
            Self::Seed => "seed",
            Self::Sequence => "sequence",
            Self::Layout => "layout",
            Self::Bits => "bits",
        };
        f.write_str(name)
    }
}

/// All errors that `seedflake` can produce.
///
/// Clock regression and sequence exhaustion are never errors: generators
/// recover from both by waiting.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A field value lies outside the range its bit width allows, or a
    /// [`BitLayout`](crate::BitLayout) does not fit in 64 bits.
    #[error("invalid {field}: {value} is outside {min}..={max}")]
    InvalidField {
        field: Field,
        value: u64,
        min: u64,
        max: u64,
    },

    /// The time since the epoch no longer fits in the layout's timestamp bits.
    #[error("timestamp overflow: {delta}ms since epoch exceeds {max}ms")]
    TimestampOverflow { delta: u64, max: u64 },

    /// The generator's lock was poisoned by a panicking thread.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,

    /// A client already owns a generator.
    #[error("cannot create generator: a generator already exists")]
    GeneratorExists,

    /// A client has no generator to use or destroy.
    #[error("no generator is available")]
    NoGenerator,
}

impl Error {
    pub(crate) const fn invalid(field: Field, value: u64, min: u64, max: u64) -> Self {
        Self::InvalidField {
            field,
            value,
            min,
            max,
        }
    }

    /// Ensures `value` lies within `min..=max`.
    pub(crate) const fn check(field: Field, value: u64, min: u64, max: u64) -> Result<u64> {
        if value < min || value > max {
            Err(Self::invalid(field, value, min, max))
        } else {
            Ok(value)
        }
    }
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}

use core::{fmt, str::FromStr};

use crate::{BitLayout, Result};

/// The unit a decoded timestamp is reported in.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    #[default]
    Millis,
    Seconds,
}

impl TimeUnit {
    pub(crate) fn convert(self, millis: u64) -> Timestamp {
        match self {
            Self::Millis => Timestamp::Millis(millis),
            #[allow(clippy::cast_precision_loss)]
            Self::Seconds => Timestamp::Seconds(millis as f64 / 1000.0),
        }
    }
}

/// Error returned when parsing a [`TimeUnit`] from anything but `ms` or `s`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown time unit `{0}` (expected `ms` or `s`)")]
pub struct ParseTimeUnitError(String);

impl FromStr for TimeUnit {
    type Err = ParseTimeUnitError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "ms" => Ok(Self::Millis),
            "s" => Ok(Self::Seconds),
            other => Err(ParseTimeUnitError(other.to_owned())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Millis => "ms",
            Self::Seconds => "s",
        })
    }
}

/// A decoded timestamp. Milliseconds are integral; seconds are fractional.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Timestamp {
    Millis(u64),
    Seconds(f64),
}

impl Timestamp {
    /// The timestamp as a float in its own unit.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Millis(ms) => ms as f64,
            Self::Seconds(secs) => secs,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millis(ms) => write!(f, "{ms}"),
            Self::Seconds(secs) => write!(f, "{secs}"),
        }
    }
}

/// Packs the fields with [`BitLayout::DEFAULT`].
///
/// # Errors
///
/// See [`BitLayout::encode`].
pub fn encode(epoch: u64, timestamp_ms: u64, worker_id: u64, seed: u64, sequence: u64) -> Result<u64> {
    BitLayout::DEFAULT.encode(epoch, timestamp_ms, worker_id, seed, sequence)
}

/// Converts an ID produced with [`BitLayout::DEFAULT`] back into the time it
/// was issued.
///
/// The epoch is not stored in the ID, so it must be the one the ID was
/// generated with. Passing any other epoch returns a meaningless value rather
/// than an error.
///
/// # Example
/// ```
/// use seedflake::{TimeUnit, Timestamp, decode_timestamp, encode};
///
/// let epoch = 1_600_000_000_000;
/// let id = encode(epoch, 1_600_000_005_250, 3, 7, 0).unwrap();
/// assert_eq!(decode_timestamp(epoch, id, TimeUnit::Millis), Timestamp::Millis(1_600_000_005_250));
/// assert_eq!(decode_timestamp(epoch, id, TimeUnit::Seconds), Timestamp::Seconds(1_600_000_005.25));
/// ```
pub fn decode_timestamp(epoch: u64, id: u64, unit: TimeUnit) -> Timestamp {
    BitLayout::DEFAULT.decode_timestamp(epoch, id, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_timestamp() {
        let epoch = 1_288_834_974_657;
        for ts in [epoch, epoch + 1, epoch + 86_400_000, epoch + (1 << 41)] {
            for (worker, seed, seq) in [(0, 0, 0), (31, 31, 4095), (3, 7, 12)] {
                let id = encode(epoch, ts, worker, seed, seq).unwrap();
                assert_eq!(decode_timestamp(epoch, id, TimeUnit::Millis), Timestamp::Millis(ts));
            }
        }
    }

    #[test]
    fn seconds_are_fractional() {
        let id = encode(0, 1_500, 0, 0, 0).unwrap();
        let ts = decode_timestamp(0, id, TimeUnit::Seconds);
        assert_eq!(ts, Timestamp::Seconds(1.5));
        assert_eq!(ts.to_string(), "1.5");
    }

    #[test]
    fn default_unit_is_millis() {
        assert_eq!(TimeUnit::default(), TimeUnit::Millis);
    }

    #[test]
    fn time_unit_parses() {
        assert_eq!("ms".parse::<TimeUnit>(), Ok(TimeUnit::Millis));
        assert_eq!("s".parse::<TimeUnit>(), Ok(TimeUnit::Seconds));
        assert!("minutes".parse::<TimeUnit>().is_err());
        assert_eq!(TimeUnit::Seconds.to_string(), "s");
    }
}

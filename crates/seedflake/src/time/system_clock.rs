use std::time::{SystemTime, UNIX_EPOCH};

use crate::TimeSource;

/// Reads the operating system's wall clock on every call.
///
/// The wall clock can be stepped backward (NTP corrections, manual changes).
/// Generators detect that and wait instead of emitting, so this clock is safe
/// to use directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    /// Milliseconds since the Unix epoch, truncated. Reads as `0` if the
    /// system clock is set before 1970.
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CUSTOM_EPOCH;

    #[test]
    fn system_clock_is_past_custom_epoch() {
        assert!(SystemClock.current_millis() > CUSTOM_EPOCH);
    }
}

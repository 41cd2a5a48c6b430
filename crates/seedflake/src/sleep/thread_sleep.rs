use core::time::Duration;

use crate::Sleeper;

/// A [`Sleeper`] that parks the current OS thread with
/// [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleep;

impl Sleeper for ThreadSleep {
    fn sleep_ms(&self, millis: u64) {
        std::thread::sleep(Duration::from_millis(millis));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn thread_sleep_waits_at_least_requested_time() {
        let start = Instant::now();
        ThreadSleep.sleep_ms(2);
        assert!(start.elapsed() >= Duration::from_millis(2));
    }
}

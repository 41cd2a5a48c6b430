/// A trait that abstracts over how a generator waits out a clock stall.
///
/// Generators call this when the clock moved backward or the sequence for the
/// current millisecond is exhausted. Tests substitute an instant or counting
/// implementation; any `Fn(u64)` closure works.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use seedflake::Sleeper;
///
/// let slept = Cell::new(0);
/// let sleeper = |ms: u64| slept.set(slept.get() + ms);
/// sleeper.sleep_ms(3);
/// assert_eq!(slept.get(), 3);
/// ```
pub trait Sleeper {
    /// Blocks the caller for `millis` milliseconds.
    fn sleep_ms(&self, millis: u64);
}

impl<F> Sleeper for F
where
    F: Fn(u64),
{
    fn sleep_ms(&self, millis: u64) {
        self(millis);
    }
}

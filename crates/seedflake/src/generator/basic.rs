use core::cell::Cell;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Flake, FlakeConfig, FlakeGenerator, GeneratorState, IdGenStatus, Result, Sleeper, SystemClock,
    ThreadSleep, TimeSource,
};

/// A non-concurrent generator suitable for single-owner use.
///
/// This generator is lightweight and fast, but **not thread-safe**: its state
/// lives in a [`Cell`], so the type is not `Sync` and cannot be shared between
/// threads. Give each thread its own generator with a distinct worker ID, or
/// use [`LockFlakeGenerator`].
///
/// ## Features
/// - ❌ Not thread-safe
/// - ✅ Any [`BitLayout`](crate::BitLayout)
///
/// ## Recommended When
/// - You're in a single-threaded environment (no shared access)
/// - You want the fastest generator
///
/// [`LockFlakeGenerator`]: crate::LockFlakeGenerator
#[derive(Debug)]
pub struct BasicFlakeGenerator<T = SystemClock, S = ThreadSleep>
where
    T: TimeSource,
    S: Sleeper,
{
    config: FlakeConfig,
    state: Cell<GeneratorState>,
    time: T,
    sleep: S,
}

impl BasicFlakeGenerator<SystemClock, ThreadSleep> {
    /// Creates a generator reading the system clock and sleeping the current
    /// thread.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_system_clock(config: FlakeConfig) -> Result<Self> {
        Self::new(config, SystemClock, ThreadSleep)
    }
}

impl<T, S> BasicFlakeGenerator<T, S>
where
    T: TimeSource,
    S: Sleeper,
{
    /// Creates a new [`BasicFlakeGenerator`] that has not issued anything yet.
    ///
    /// # Parameters
    ///
    /// - `config`: epoch, worker ID, seed, and bit layout. Encoded into every
    ///   issued ID.
    /// - `time`: A [`TimeSource`] implementation (e.g., [`SystemClock`]) read
    ///   on every attempt.
    /// - `sleep`: A [`Sleeper`] used to wait out clock regressions and
    ///   exhausted sequences.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`](crate::Error::InvalidField) if the
    /// worker ID or seed does not fit the layout.
    ///
    /// # Example
    /// ```
    /// use seedflake::{BasicFlakeGenerator, FlakeConfig, SystemClock, ThreadSleep};
    ///
    /// let generator =
    ///     BasicFlakeGenerator::new(FlakeConfig::new(0, 31, 31), SystemClock, ThreadSleep).unwrap();
    /// assert_eq!(generator.worker_id(), 31);
    ///
    /// assert!(BasicFlakeGenerator::new(FlakeConfig::new(0, 32, 0), SystemClock, ThreadSleep).is_err());
    /// ```
    pub fn new(config: FlakeConfig, time: T, sleep: S) -> Result<Self> {
        Self::from_state(config, GeneratorState::new(), time, sleep)
    }

    /// Creates a generator preloaded with an explicit state.
    ///
    /// In typical use cases, you should prefer [`Self::new`].
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_state(
        config: FlakeConfig,
        state: GeneratorState,
        time: T,
        sleep: S,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: Cell::new(state),
            time,
            sleep,
        })
    }

    pub const fn config(&self) -> &FlakeConfig {
        &self.config
    }

    pub const fn epoch(&self) -> u64 {
        self.config.epoch()
    }

    pub const fn worker_id(&self) -> u64 {
        self.config.worker_id()
    }

    pub const fn seed(&self) -> u64 {
        self.config.seed()
    }

    /// A snapshot of the current cross-call state.
    pub fn state(&self) -> GeneratorState {
        self.state.get()
    }

    /// Makes one attempt to issue an ID without blocking.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: A new ID was issued
    /// - `Ok(IdGenStatus::Pending { yield_for })`: The time to wait (in
    ///   milliseconds) before trying again
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOverflow`](crate::Error::TimestampOverflow)
    /// once the layout's timestamp field is exhausted.
    ///
    /// # Example
    /// ```
    /// use seedflake::{BasicFlakeGenerator, FlakeConfig, IdGenStatus};
    ///
    /// let generator = BasicFlakeGenerator::with_system_clock(FlakeConfig::new(0, 1, 2)).unwrap();
    ///
    /// let id = loop {
    ///     match generator.poll_id().unwrap() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.seed(), 2);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<IdGenStatus> {
        let now = self.time.current_millis();
        let mut state = self.state.get();
        let status = state.step(now, &self.config)?;
        self.state.set(state);
        Ok(status)
    }

    /// Issues the next ID, sleeping through any [`IdGenStatus::Pending`].
    ///
    /// # Errors
    ///
    /// See [`Self::poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self) -> Result<Flake> {
        loop {
            match self.poll_id()? {
                IdGenStatus::Ready { id } => break Ok(id),
                IdGenStatus::Pending { yield_for } => self.sleep.sleep_ms(yield_for),
            }
        }
    }
}

impl<T, S> FlakeGenerator<T, S> for BasicFlakeGenerator<T, S>
where
    T: TimeSource,
    S: Sleeper,
{
    fn new(config: FlakeConfig, time: T, sleep: S) -> Result<Self> {
        Self::new(config, time, sleep)
    }

    fn config(&self) -> &FlakeConfig {
        self.config()
    }

    fn poll_id(&self) -> Result<IdGenStatus> {
        self.poll_id()
    }

    fn generate(&self) -> Result<Flake> {
        self.generate()
    }
}

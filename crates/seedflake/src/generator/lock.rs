use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Flake, FlakeConfig, FlakeGenerator, GeneratorState, IdGenStatus, Result, Sleeper, SystemClock,
    ThreadSleep, TimeSource, generator::mutex::Mutex,
};

/// A lock-based generator suitable for multi-threaded environments.
///
/// This generator wraps its state in an [`Arc<Mutex<_>>`], allowing safe
/// shared use across threads. Each attempt reads the clock and updates the
/// state inside one critical section, so concurrent callers can never observe
/// the same `(last_timestamp, sequence)` pair. Waiting happens outside the
/// lock.
///
/// Cloning the generator shares the same state: clones are handles to one
/// generator, not new generators.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Any [`BitLayout`](crate::BitLayout)
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access across threads is important
///
/// ## See Also
/// - [`BasicFlakeGenerator`]
///
/// [`BasicFlakeGenerator`]: crate::BasicFlakeGenerator
#[derive(Clone, Debug)]
pub struct LockFlakeGenerator<T = SystemClock, S = ThreadSleep>
where
    T: TimeSource,
    S: Sleeper,
{
    config: FlakeConfig,
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<GeneratorState>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<GeneratorState>>,
    time: T,
    sleep: S,
}

impl LockFlakeGenerator<SystemClock, ThreadSleep> {
    /// Creates a generator reading the system clock and sleeping the calling
    /// thread.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_system_clock(config: FlakeConfig) -> Result<Self> {
        Self::new(config, SystemClock, ThreadSleep)
    }
}

impl<T, S> LockFlakeGenerator<T, S>
where
    T: TimeSource,
    S: Sleeper,
{
    /// Creates a new [`LockFlakeGenerator`] that has not issued anything yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`](crate::Error::InvalidField) if the
    /// worker ID or seed does not fit the layout.
    ///
    /// # Example
    /// ```
    /// use seedflake::{FlakeConfig, LockFlakeGenerator};
    ///
    /// let generator = LockFlakeGenerator::with_system_clock(FlakeConfig::new(0, 4, 9)).unwrap();
    ///
    /// std::thread::scope(|s| {
    ///     for _ in 0..4 {
    ///         let generator = generator.clone();
    ///         s.spawn(move || generator.generate().unwrap());
    ///     }
    /// });
    /// ```
    pub fn new(config: FlakeConfig, time: T, sleep: S) -> Result<Self> {
        Self::from_state(config, GeneratorState::new(), time, sleep)
    }

    /// Creates a generator preloaded with an explicit state.
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
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(state))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(state)),
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

    /// Makes one attempt to issue an ID without blocking.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: A new ID was issued
    /// - `Ok(IdGenStatus::Pending { yield_for })`: The time to wait (in
    ///   milliseconds) before trying again
    ///
    /// # Errors
    /// - Returns an error if the underlying lock has been poisoned.
    /// - Returns [`Error::TimestampOverflow`](crate::Error::TimestampOverflow)
    ///   once the layout's timestamp field is exhausted.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<IdGenStatus> {
        #[cfg(feature = "parking-lot")]
        let mut state = self.state.lock();
        #[cfg(not(feature = "parking-lot"))]
        let mut state = self.state.lock()?;
        let now = self.time.current_millis();
        state.step(now, &self.config)
    }

    /// Issues the next ID, sleeping through any [`IdGenStatus::Pending`]
    /// without holding the lock.
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

impl<T, S> FlakeGenerator<T, S> for LockFlakeGenerator<T, S>
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

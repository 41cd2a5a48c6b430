use crate::{BitLayout, Flake, FlakeConfig, IdGenStatus, Result, Sleeper, TimeSource};

/// A minimal interface for issuing IDs.
pub trait FlakeGenerator<T, S>
where
    T: TimeSource,
    S: Sleeper,
{
    /// Creates a new generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`](crate::Error::InvalidField) if the
    /// worker ID or seed does not fit the configured layout.
    fn new(config: FlakeConfig, time: T, sleep: S) -> Result<Self>
    where
        Self: Sized;

    /// The parameters this generator was built with.
    fn config(&self) -> &FlakeConfig;

    /// Makes one non-blocking attempt to issue an ID.
    ///
    /// # Errors
    ///
    /// May return an error if the timestamp no longer fits the layout or the
    /// underlying implementation uses a lock and it is poisoned.
    fn poll_id(&self) -> Result<IdGenStatus>;

    /// Issues the next ID, waiting through clock regressions and sequence
    /// exhaustion with the generator's [`Sleeper`].
    ///
    /// # Errors
    ///
    /// Same as [`FlakeGenerator::poll_id`].
    fn generate(&self) -> Result<Flake>;

    fn epoch(&self) -> u64 {
        self.config().epoch()
    }

    fn worker_id(&self) -> u64 {
        self.config().worker_id()
    }

    fn seed(&self) -> u64 {
        self.config().seed()
    }

    fn layout(&self) -> BitLayout {
        self.config().layout()
    }
}

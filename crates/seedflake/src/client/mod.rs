mod info;

pub use info::*;

use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BasicFlakeGenerator, BitLayout, Error, Flake, FlakeConfig, GeneratorState, Result, Sleeper,
    SystemClock, ThreadSleep, TimeSource, TimeUnit, Timestamp,
};

/// Manages the lifecycle of a single generator for one epoch and remembers
/// what it issued.
///
/// A client either owns a generator or it does not. Renewing swaps in a new
/// generator (new worker ID and seed) while keeping the epoch, the issued-ID
/// cache, and the running count.
///
/// If you need more than one generator, create more than one client; IDs are
/// unique to the worker ID and seed used, and to the client's epoch.
///
/// # Example
/// ```
/// use seedflake::{FlakeClient, TimeUnit, Timestamp};
///
/// let mut client = FlakeClient::new(1_600_000_000_000);
/// client.create_generator(3, 7).unwrap();
///
/// let id = client.generate().unwrap();
/// assert_eq!(client.lookup(id.raw()), Some(&id));
/// assert_eq!(
///     client.timestamp(id.raw(), TimeUnit::Millis),
///     Timestamp::Millis(id.timestamp())
/// );
/// assert_eq!(client.info().generated, 1);
/// ```
#[derive(Debug)]
pub struct FlakeClient<T = SystemClock, S = ThreadSleep>
where
    T: TimeSource + Clone,
    S: Sleeper + Clone,
{
    epoch: u64,
    layout: BitLayout,
    generator: Option<BasicFlakeGenerator<T, S>>,
    generated: u64,
    cache: HashMap<u64, Flake>,
    time: T,
    sleep: S,
}

impl FlakeClient<SystemClock, ThreadSleep> {
    /// A client using the system clock, thread sleeps, and the default layout.
    pub fn new(epoch: u64) -> Self {
        Self::with_sources(epoch, BitLayout::DEFAULT, SystemClock, ThreadSleep)
    }
}

impl<T, S> FlakeClient<T, S>
where
    T: TimeSource + Clone,
    S: Sleeper + Clone,
{
    /// A client whose generators read `time`, wait with `sleep`, and pack IDs
    /// with `layout`.
    pub fn with_sources(epoch: u64, layout: BitLayout, time: T, sleep: S) -> Self {
        Self {
            epoch,
            layout,
            generator: None,
            generated: 0,
            cache: HashMap::new(),
            time,
            sleep,
        }
    }

    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    pub const fn layout(&self) -> BitLayout {
        self.layout
    }

    /// The live generator, if any.
    pub const fn generator(&self) -> Option<&BasicFlakeGenerator<T, S>> {
        self.generator.as_ref()
    }

    pub const fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Builds a generator for `worker_id` and `seed`.
    ///
    /// # Errors
    ///
    /// - [`Error::GeneratorExists`] if the client already owns one; destroy or
    ///   renew it instead.
    /// - [`Error::InvalidField`] if the worker ID or seed does not fit the
    ///   layout.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn create_generator(&mut self, worker_id: u64, seed: u64) -> Result<()> {
        if self.generator.is_some() {
            return Err(Error::GeneratorExists);
        }
        let config = FlakeConfig::new(self.epoch, worker_id, seed).with_layout(self.layout);
        self.generator = Some(BasicFlakeGenerator::new(
            config,
            self.time.clone(),
            self.sleep.clone(),
        )?);
        Ok(())
    }

    /// Drops the current generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoGenerator`] if there is nothing to destroy.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn destroy_generator(&mut self) -> Result<()> {
        self.generator.take().map(drop).ok_or(Error::NoGenerator)
    }

    /// Replaces the current generator, if any, with a new one.
    ///
    /// The new generator is validated before the old one is dropped, so a
    /// failed renewal leaves the client unchanged. It resumes from the old
    /// generator's state, so renewing with the same worker ID and seed never
    /// reissues an ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] if the worker ID or seed does not fit
    /// the layout.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn renew_generator(&mut self, worker_id: u64, seed: u64) -> Result<()> {
        let config = FlakeConfig::new(self.epoch, worker_id, seed).with_layout(self.layout);
        let state = self
            .generator
            .as_ref()
            .map_or_else(GeneratorState::new, BasicFlakeGenerator::state);
        let generator =
            BasicFlakeGenerator::from_state(config, state, self.time.clone(), self.sleep.clone())?;
        self.generator = Some(generator);
        Ok(())
    }

    /// Issues an ID from the current generator, caches it, and counts it.
    ///
    /// # Errors
    ///
    /// - [`Error::NoGenerator`] if the client has no generator.
    /// - Whatever [`BasicFlakeGenerator::generate`] returns.
    pub fn generate(&mut self) -> Result<Flake> {
        let generator = self.generator.as_ref().ok_or(Error::NoGenerator)?;
        let id = generator.generate()?;
        self.cache.insert(id.raw(), id);
        self.generated += 1;
        Ok(id)
    }

    /// Finds a previously issued ID by its raw value.
    pub fn lookup(&self, raw: u64) -> Option<&Flake> {
        self.cache.get(&raw)
    }

    /// Every ID this client has issued, keyed by raw value.
    pub const fn cache(&self) -> &HashMap<u64, Flake> {
        &self.cache
    }

    /// Decodes the issuance time of `raw` using this client's epoch and
    /// layout. Works for any ID, not only cached ones.
    pub fn timestamp(&self, raw: u64, unit: TimeUnit) -> Timestamp {
        self.layout.decode_timestamp(self.epoch, raw, unit)
    }

    /// A summary of the client's current state.
    pub fn info(&self) -> ClientInfo {
        let config = self.generator.as_ref().map(BasicFlakeGenerator::config);
        ClientInfo {
            epoch: self.epoch,
            worker_id: config.map(FlakeConfig::worker_id),
            seed: config.map(FlakeConfig::seed),
            generated: self.generated,
            generator: config.is_some(),
        }
    }
}

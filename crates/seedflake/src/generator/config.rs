use crate::{BitLayout, Result};

/// The construction-time parameters of a generator.
///
/// All fields are fixed for the lifetime of a generator. To change any of
/// them, build a new generator and drop the old one.
///
/// # Example
/// ```
/// use seedflake::{BitLayout, FlakeConfig};
///
/// let config = FlakeConfig::new(1_600_000_000_000, 3, 7);
/// assert!(config.validate().is_ok());
///
/// let wide = FlakeConfig::new(0, 200, 0).with_layout(BitLayout::new(8, 0, 12).unwrap());
/// assert!(wide.validate().is_ok());
/// assert!(FlakeConfig::new(0, 200, 0).validate().is_err());
/// ```
// No `Deserialize`: the layout is only validated by `BitLayout::new`.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlakeConfig {
    epoch: u64,
    worker_id: u64,
    seed: u64,
    layout: BitLayout,
}

impl FlakeConfig {
    /// A configuration using [`BitLayout::DEFAULT`]. Not validated until
    /// [`Self::validate`] or a generator constructor runs.
    pub const fn new(epoch: u64, worker_id: u64, seed: u64) -> Self {
        Self {
            epoch,
            worker_id,
            seed,
            layout: BitLayout::DEFAULT,
        }
    }

    #[must_use]
    pub const fn with_layout(mut self, layout: BitLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Ensures the worker ID and seed fit the layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`](crate::Error::InvalidField) naming the
    /// first field that does not fit.
    pub fn validate(&self) -> Result<()> {
        self.layout.check_worker_id(self.worker_id)?;
        self.layout.check_seed(self.seed)?;
        Ok(())
    }

    /// Milliseconds since the Unix epoch that IDs are measured from.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub const fn layout(&self) -> BitLayout {
        self.layout
    }
}

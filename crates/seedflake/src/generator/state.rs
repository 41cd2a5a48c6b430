use crate::{Error, Field, Flake, FlakeConfig, IdGenStatus, Result};

/// The cross-call state of a generator: the timestamp of the last issued ID
/// and the sequence it used.
///
/// Generators own exactly one of these and only mutate it through
/// [`GeneratorState::step`]. It can also be driven by hand, which is how
/// callers build their own serialization around it (an actor, a per-thread
/// owner, ...).
///
/// # Example
/// ```
/// use seedflake::{FlakeConfig, GeneratorState, IdGenStatus};
///
/// let config = FlakeConfig::new(0, 1, 1);
/// let mut state = GeneratorState::new();
///
/// let IdGenStatus::Ready { id } = state.step(42, &config).unwrap() else {
///     unreachable!()
/// };
/// assert_eq!(id.sequence(), 0);
///
/// // The clock went back 2ms: nothing is issued.
/// assert_eq!(state.step(40, &config).unwrap(), IdGenStatus::Pending { yield_for: 2 });
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeneratorState {
    last_timestamp: Option<u64>,
    sequence: u64,
}

impl GeneratorState {
    /// A state that has never issued an ID.
    pub const fn new() -> Self {
        Self {
            last_timestamp: None,
            sequence: 0,
        }
    }

    /// Restores a state from explicit components, e.g. to resume past a
    /// known point.
    pub const fn from_components(last_timestamp: Option<u64>, sequence: u64) -> Self {
        Self {
            last_timestamp,
            sequence,
        }
    }

    /// The absolute timestamp (ms) of the most recent issuance, if any.
    pub const fn last_timestamp(&self) -> Option<u64> {
        self.last_timestamp
    }

    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Runs one issuance cycle against a clock reading `now` (ms since the Unix
    /// epoch).
    ///
    /// - Clock behind `last_timestamp`: returns `Pending` for the difference
    ///   and leaves the state untouched.
    /// - Same millisecond: increments the sequence. When it wraps, the
    ///   sequence is pinned at its maximum and `Pending { yield_for: 1 }` is
    ///   returned, so at most `2^Q` IDs are issued per millisecond.
    /// - New millisecond: resets the sequence to zero.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidField`] with [`Field::Timestamp`] if `now` is before
    ///   the epoch.
    /// - [`Error::TimestampOverflow`] once `now - epoch` no longer fits the
    ///   layout's timestamp bits.
    ///
    /// The state is left untouched on error.
    pub fn step(&mut self, now: u64, config: &FlakeConfig) -> Result<IdGenStatus> {
        if let Some(last) = self.last_timestamp.filter(|&last| last > now) {
            return Ok(Self::cold_clock_behind(now, last));
        }

        let epoch = config.epoch();
        let layout = config.layout();
        if now < epoch {
            return Err(Self::cold_before_epoch(now, epoch, layout.max_timestamp()));
        }

        let delta = now - epoch;
        if delta > layout.max_timestamp() {
            return Err(Error::TimestampOverflow {
                delta,
                max: layout.max_timestamp(),
            });
        }

        if self.last_timestamp == Some(now) {
            let next = (self.sequence.min(layout.max_sequence()) + 1) & layout.max_sequence();
            if next == 0 {
                self.sequence = layout.max_sequence();
                return Ok(Self::cold_sequence_exhausted(now));
            }
            self.sequence = next;
        } else {
            self.sequence = 0;
        }
        self.last_timestamp = Some(now);

        let raw = layout.pack(delta, config.worker_id(), config.seed(), self.sequence);
        Ok(IdGenStatus::Ready {
            id: Flake::from_parts(
                raw,
                now,
                config.worker_id(),
                config.seed(),
                self.sequence,
            ),
        })
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> IdGenStatus {
        let yield_for = last - now;
        #[cfg(feature = "tracing")]
        tracing::debug!(now, last, yield_for, "clock moved backward, waiting");
        IdGenStatus::Pending { yield_for }
    }

    #[cold]
    #[inline(never)]
    fn cold_before_epoch(now: u64, epoch: u64, max_timestamp: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, epoch, "clock is before the epoch");
        Error::invalid(
            Field::Timestamp,
            now,
            epoch,
            epoch.saturating_add(max_timestamp),
        )
    }

    #[cold]
    #[inline(never)]
    fn cold_sequence_exhausted(_now: u64) -> IdGenStatus {
        #[cfg(feature = "tracing")]
        tracing::trace!(now = _now, "sequence exhausted, waiting for next millisecond");
        IdGenStatus::Pending { yield_for: 1 }
    }
}

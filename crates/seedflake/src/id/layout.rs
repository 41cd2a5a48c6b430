use crate::{Error, Field, Flake, Result, TimeUnit, Timestamp};

/// Returns a mask with the lowest `bits` bits set. Saturates at 64 bits.
const fn mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

/// The bit widths of the low fields of a [`Flake`].
///
/// The timestamp takes whatever is left of the 64 bits once the worker, seed,
/// and sequence fields are placed:
///
/// ```text
///  Bit Index:  63           W+S+Q  W+S+Q-1      W+Q  W+Q-1       Q  Q-1          0
///              +------------------+-----------------+--------------+--------------+
///  Field:      | timestamp (64-L) | seed (S)        | worker (W)   | sequence (Q) |
///              +------------------+-----------------+--------------+--------------+
/// ```
///
/// A layout is fixed when a generator is built. Decoding an ID with a layout
/// other than the one that encoded it yields meaningless values; that is the
/// caller's contract and is not detected.
// No `Deserialize`: widths are only validated by `BitLayout::new`.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    worker_bits: u8,
    seed_bits: u8,
    sequence_bits: u8,
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitLayout {
    /// 5 worker bits, 5 seed bits, 12 sequence bits. Leaves 42 timestamp bits,
    /// roughly 139 years past the epoch.
    pub const DEFAULT: Self = Self {
        worker_bits: 5,
        seed_bits: 5,
        sequence_bits: 12,
    };

    /// The most low bits a layout may claim; at least one bit must remain for
    /// the timestamp.
    pub const MAX_LOW_BITS: u32 = u64::BITS - 1;

    /// Creates a layout from explicit field widths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] with [`Field::Layout`] if the three
    /// widths together exceed [`Self::MAX_LOW_BITS`].
    ///
    /// # Example
    /// ```
    /// use seedflake::BitLayout;
    ///
    /// let layout = BitLayout::new(10, 0, 12).unwrap();
    /// assert_eq!(layout.timestamp_bits(), 42);
    /// assert!(BitLayout::new(32, 32, 1).is_err());
    /// ```
    pub fn new(worker_bits: u8, seed_bits: u8, sequence_bits: u8) -> Result<Self> {
        let low = u64::from(worker_bits) + u64::from(seed_bits) + u64::from(sequence_bits);
        Error::check(Field::Layout, low, 0, Self::MAX_LOW_BITS as u64)?;
        Ok(Self {
            worker_bits,
            seed_bits,
            sequence_bits,
        })
    }

    pub const fn worker_bits(&self) -> u32 {
        self.worker_bits as u32
    }

    pub const fn seed_bits(&self) -> u32 {
        self.seed_bits as u32
    }

    pub const fn sequence_bits(&self) -> u32 {
        self.sequence_bits as u32
    }

    /// Total width of the worker, seed, and sequence fields.
    pub const fn low_bits(&self) -> u32 {
        self.worker_bits() + self.seed_bits() + self.sequence_bits()
    }

    pub const fn timestamp_bits(&self) -> u32 {
        u64::BITS - self.low_bits()
    }

    pub const fn max_worker_id(&self) -> u64 {
        mask(self.worker_bits())
    }

    pub const fn max_seed(&self) -> u64 {
        mask(self.seed_bits())
    }

    pub const fn max_sequence(&self) -> u64 {
        mask(self.sequence_bits())
    }

    /// The largest representable number of milliseconds since the epoch.
    pub const fn max_timestamp(&self) -> u64 {
        mask(self.timestamp_bits())
    }

    pub const fn worker_shift(&self) -> u32 {
        self.sequence_bits()
    }

    pub const fn seed_shift(&self) -> u32 {
        self.worker_bits() + self.sequence_bits()
    }

    pub const fn timestamp_shift(&self) -> u32 {
        self.low_bits()
    }

    /// Packs the fields into a raw 64-bit ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] if `timestamp_ms` is before `epoch` or
    /// too far past it, or if any other field exceeds its width. Values are
    /// never truncated.
    ///
    /// # Example
    /// ```
    /// use seedflake::BitLayout;
    ///
    /// let raw = BitLayout::DEFAULT.encode(1_000, 6_000, 3, 7, 0).unwrap();
    /// assert_eq!(raw, (5_000 << 22) | (7 << 17) | (3 << 12));
    /// ```
    pub fn encode(
        &self,
        epoch: u64,
        timestamp_ms: u64,
        worker_id: u64,
        seed: u64,
        sequence: u64,
    ) -> Result<u64> {
        let delta = timestamp_ms.checked_sub(epoch).ok_or(Error::invalid(
            Field::Timestamp,
            timestamp_ms,
            epoch,
            epoch.saturating_add(self.max_timestamp()),
        ))?;
        if delta > self.max_timestamp() {
            return Err(Error::invalid(
                Field::Timestamp,
                timestamp_ms,
                epoch,
                epoch.saturating_add(self.max_timestamp()),
            ));
        }
        self.check_worker_id(worker_id)?;
        self.check_seed(seed)?;
        Error::check(Field::Sequence, sequence, 0, self.max_sequence())?;

        Ok(self.pack(delta, worker_id, seed, sequence))
    }

    /// Packs fields that are already known to be in range.
    pub(crate) const fn pack(&self, delta: u64, worker_id: u64, seed: u64, sequence: u64) -> u64 {
        (delta << self.timestamp_shift())
            | (seed << self.seed_shift())
            | (worker_id << self.worker_shift())
            | sequence
    }

    pub(crate) const fn check_worker_id(&self, worker_id: u64) -> Result<u64> {
        Error::check(Field::WorkerId, worker_id, 0, self.max_worker_id())
    }

    pub(crate) const fn check_seed(&self, seed: u64) -> Result<u64> {
        Error::check(Field::Seed, seed, 0, self.max_seed())
    }

    /// Recovers the absolute timestamp of `raw` in milliseconds.
    ///
    /// The low fields are stripped and `epoch` is added back. Saturates
    /// instead of wrapping when handed an unrelated value.
    pub const fn decode_millis(&self, epoch: u64, raw: u64) -> u64 {
        (raw >> self.timestamp_shift()).saturating_add(epoch)
    }

    /// Recovers the absolute timestamp of `raw` in the requested unit.
    pub fn decode_timestamp(&self, epoch: u64, raw: u64, unit: TimeUnit) -> Timestamp {
        unit.convert(self.decode_millis(epoch, raw))
    }

    /// Splits `raw` back into all of its fields.
    ///
    /// # Example
    /// ```
    /// use seedflake::BitLayout;
    ///
    /// let layout = BitLayout::DEFAULT;
    /// let raw = layout.encode(1_000, 6_000, 3, 7, 9).unwrap();
    /// let flake = layout.decode(1_000, raw);
    /// assert_eq!(flake.timestamp(), 6_000);
    /// assert_eq!(flake.worker_id(), 3);
    /// assert_eq!(flake.seed(), 7);
    /// assert_eq!(flake.sequence(), 9);
    /// ```
    pub const fn decode(&self, epoch: u64, raw: u64) -> Flake {
        Flake::from_parts(
            raw,
            self.decode_millis(epoch, raw),
            (raw >> self.worker_shift()) & self.max_worker_id(),
            (raw >> self.seed_shift()) & self.max_seed(),
            raw & self.max_sequence(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_reference_widths() {
        let layout = BitLayout::default();
        assert_eq!(layout.low_bits(), 22);
        assert_eq!(layout.timestamp_bits(), 42);
        assert_eq!(layout.max_worker_id(), 31);
        assert_eq!(layout.max_seed(), 31);
        assert_eq!(layout.max_sequence(), 4095);
        assert_eq!(layout.max_timestamp(), (1 << 42) - 1);
        assert_eq!(layout.worker_shift(), 12);
        assert_eq!(layout.seed_shift(), 17);
        assert_eq!(layout.timestamp_shift(), 22);
    }

    #[test]
    fn layout_must_leave_a_timestamp_bit() {
        assert!(BitLayout::new(21, 21, 21).is_ok());
        let err = BitLayout::new(21, 21, 22).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidField {
                field: Field::Layout,
                value: 64,
                min: 0,
                max: 63,
            }
        );
    }

    #[test]
    fn zero_width_fields_only_accept_zero() {
        let layout = BitLayout::new(0, 0, 12).unwrap();
        assert_eq!(layout.max_worker_id(), 0);
        assert_eq!(layout.timestamp_bits(), 52);
        assert!(layout.encode(0, 1, 0, 0, 0).is_ok());
        assert!(layout.encode(0, 1, 1, 0, 0).is_err());
    }

    #[test]
    fn encode_matches_reference_formula() {
        let epoch = 1_600_000_000_000;
        let raw = BitLayout::DEFAULT
            .encode(epoch, 1_600_000_005_000, 3, 7, 0)
            .unwrap();
        assert_eq!(raw, (5_000 << 22) | (7 << 17) | (3 << 12));
    }

    #[test]
    fn encode_rejects_out_of_range_fields() {
        let layout = BitLayout::DEFAULT;
        let err = layout.encode(0, 0, 32, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                field: Field::WorkerId,
                value: 32,
                ..
            }
        ));
        let err = layout.encode(0, 0, 0, 32, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: Field::Seed, .. }));
        let err = layout.encode(0, 0, 0, 0, 4096).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: Field::Sequence, .. }));
    }

    #[test]
    fn encode_rejects_timestamps_outside_epoch_window() {
        let layout = BitLayout::DEFAULT;
        let err = layout.encode(1_000, 999, 0, 0, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: Field::Timestamp, .. }));
        let past_end = 1_000 + layout.max_timestamp() + 1;
        assert!(layout.encode(1_000, past_end, 0, 0, 0).is_err());
        assert!(layout.encode(1_000, past_end - 1, 0, 0, 0).is_ok());
    }

    #[test]
    fn decode_recovers_every_field_for_custom_layout() {
        let layout = BitLayout::new(8, 3, 10).unwrap();
        let epoch = 1_420_070_400_000;
        let ts = epoch + 123_456_789;
        let raw = layout.encode(epoch, ts, 200, 5, 1023).unwrap();
        let flake = layout.decode(epoch, raw);
        assert_eq!(flake.raw(), raw);
        assert_eq!(flake.timestamp(), ts);
        assert_eq!(flake.worker_id(), 200);
        assert_eq!(flake.seed(), 5);
        assert_eq!(flake.sequence(), 1023);
    }

    #[test]
    fn decode_with_wrong_epoch_is_not_an_error() {
        let layout = BitLayout::DEFAULT;
        let raw = layout.encode(1_000, 2_000, 1, 1, 1).unwrap();
        assert_eq!(layout.decode_millis(0, raw), 1_000);
        assert_eq!(layout.decode_millis(u64::MAX, raw), u64::MAX);
    }

    #[test]
    fn full_width_timestamp_layout() {
        let layout = BitLayout::new(0, 0, 0).unwrap();
        assert_eq!(layout.max_timestamp(), u64::MAX);
        assert_eq!(layout.encode(0, u64::MAX, 0, 0, 0).unwrap(), u64::MAX);
    }
}

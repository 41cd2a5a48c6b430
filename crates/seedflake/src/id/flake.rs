use core::{cmp::Ordering, fmt, hash::Hash};

/// An issued identifier together with the fields it was packed from.
///
/// The raw value is what callers store and sort; the other fields are for
/// introspection. Equality, ordering, and hashing only consider the raw value.
///
/// A `Flake` does not carry its epoch or [`BitLayout`]. Decoding a raw value
/// requires the same epoch and layout that produced it.
///
/// [`BitLayout`]: crate::BitLayout
// No `Deserialize`: the fields must agree with `raw`, which only
// `BitLayout::decode` and the generators guarantee.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug)]
pub struct Flake {
    raw: u64,
    timestamp: u64,
    worker_id: u64,
    seed: u64,
    sequence: u64,
}

impl Flake {
    pub(crate) const fn from_parts(
        raw: u64,
        timestamp: u64,
        worker_id: u64,
        seed: u64,
        sequence: u64,
    ) -> Self {
        Self {
            raw,
            timestamp,
            worker_id,
            seed,
            sequence,
        }
    }

    /// The packed 64-bit value.
    pub const fn raw(&self) -> u64 {
        self.raw
    }

    /// Absolute issuance time in milliseconds since the Unix epoch.
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the ID as a zero-padded 20-digit string, which sorts the same
    /// way the raw values do.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.raw)
    }
}

impl From<Flake> for u64 {
    fn from(flake: Flake) -> Self {
        flake.raw
    }
}

impl PartialEq for Flake {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Flake {}

impl PartialOrd for Flake {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Flake {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Hash for Flake {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for Flake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

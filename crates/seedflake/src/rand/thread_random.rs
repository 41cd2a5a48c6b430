use rand::{Rng, rng};

use crate::RandSource;

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// This RNG is fast, cryptographically secure (ChaCha-based), and automatically
/// reseeded periodically. This type does **not** store the RNG itself; it
/// simply accesses the thread-local generator on each call, so it may be
/// freely shared across threads.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn rand_inclusive(&self, low: u64, high: u64) -> u64 {
        rng().random_range(low..=high)
    }
}

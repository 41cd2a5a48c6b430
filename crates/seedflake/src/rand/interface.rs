use crate::{Error, Field, Result};

/// A trait for random sources that draw integers from an inclusive range.
///
/// This abstraction allows you to plug in a real random source or a mocked
/// random source in tests.
///
/// # Example
/// ```
/// use seedflake::{RandSource, random_in_range_with};
///
/// struct Lowest;
/// impl RandSource for Lowest {
///     fn rand_inclusive(&self, low: u64, _high: u64) -> u64 {
///         low
///     }
/// }
///
/// assert_eq!(random_in_range_with(&Lowest, 5).unwrap(), 1);
/// ```
pub trait RandSource {
    /// Returns an integer drawn uniformly from `low..=high`.
    fn rand_inclusive(&self, low: u64, high: u64) -> u64;
}

/// The widest field [`random_in_range`] will draw for.
pub const MAX_RANDOM_BITS: u32 = u64::BITS - 1;

/// Draws a worker ID or seed uniformly from `1..=2^bits - 1` using the
/// thread-local RNG.
///
/// Zero is never returned, so a randomly assigned value is always
/// distinguishable from an unset one.
///
/// # Errors
///
/// Returns [`Error::InvalidField`] with [`Field::Bits`] unless `bits` is in
/// `1..=63`.
///
/// # Example
/// ```
/// use seedflake::random_in_range;
///
/// for _ in 0..100 {
///     let seed = random_in_range(5).unwrap();
///     assert!((1..=31).contains(&seed));
/// }
/// assert!(random_in_range(0).is_err());
/// ```
pub fn random_in_range(bits: u32) -> Result<u64> {
    random_in_range_with(&crate::ThreadRandom, bits)
}

/// [`random_in_range`] with an explicit random source.
///
/// # Errors
///
/// See [`random_in_range`].
pub fn random_in_range_with<R>(rng: &R, bits: u32) -> Result<u64>
where
    R: RandSource + ?Sized,
{
    Error::check(Field::Bits, u64::from(bits), 1, u64::from(MAX_RANDOM_BITS))?;
    let max = (1 << bits) - 1;
    Ok(rng.rand_inclusive(1, max))
}

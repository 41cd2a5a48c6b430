use crate::Flake;

/// Represents the result of a single attempt to issue an ID.
///
/// - [`IdGenStatus::Ready`] indicates a new ID was issued.
/// - [`IdGenStatus::Pending`] means nothing was issued: either the clock moved
///   backward, it has not yet reached the epoch, or the sequence for the
///   current millisecond is exhausted. Wait `yield_for` milliseconds and try
///   again.
///
/// This allows non-blocking issuance loops and custom backoff strategies on
/// top of [`FlakeGenerator::poll_id`](crate::FlakeGenerator::poll_id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was issued and is ready to use.
    Ready {
        /// The issued ID.
        id: Flake,
    },
    /// No ID could be issued during this attempt.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}

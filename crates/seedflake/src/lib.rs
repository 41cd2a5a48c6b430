//! # seedflake
//!
//! Sortable, globally unique 64-bit identifiers generated without central
//! coordination. Each [`Flake`] packs, from most to least significant bit:
//!
//! ```text
//!  +-------------------+---------------+-------------+---------------+
//!  | timestamp (42)    | seed (5)      | worker (5)  | sequence (12) |
//!  +-------------------+---------------+-------------+---------------+
//!  |<----- MSB -------------- 64 bits -------------------- LSB ----->|
//! ```
//!
//! The widths above are the [`BitLayout::DEFAULT`]; any layout that leaves at
//! least one timestamp bit is accepted.
//!
//! ```
//! use seedflake::{BasicFlakeGenerator, FlakeConfig, TimeUnit, Timestamp, decode_timestamp};
//!
//! let config = FlakeConfig::new(1_600_000_000_000, 3, 7);
//! let generator = BasicFlakeGenerator::with_system_clock(config).unwrap();
//!
//! let id = generator.generate().unwrap();
//! let Timestamp::Millis(ms) = decode_timestamp(1_600_000_000_000, id.raw(), TimeUnit::Millis)
//! else {
//!     unreachable!()
//! };
//! assert_eq!(ms, id.timestamp());
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod client;
mod error;
mod generator;
mod id;
mod rand;
mod sleep;
mod time;

pub use crate::client::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::rand::*;
pub use crate::sleep::*;
pub use crate::time::*;

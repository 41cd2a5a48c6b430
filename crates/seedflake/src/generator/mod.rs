mod basic;
mod config;
mod interface;
mod lock;
mod mutex;
mod state;
mod status;
#[cfg(test)]
mod tests;

pub use basic::*;
pub use config::*;
pub use interface::*;
pub use lock::*;
pub use state::*;
pub use status::*;

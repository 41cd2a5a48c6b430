mod interface;
mod thread_sleep;

pub use interface::*;
pub use thread_sleep::*;

mod codec;
mod flake;
mod layout;

pub use codec::*;
pub use flake::*;
pub use layout::*;

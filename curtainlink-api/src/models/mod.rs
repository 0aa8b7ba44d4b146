mod curtain;
mod event;
mod hub;

pub use curtain::*;
pub use event::*;
pub use hub::*;

/// Sequential identifier issued to each curtain when it is registered.
pub type Id = u32;

/// Fully closed.
pub const POSITION_CLOSED: u8 = 0;

/// Fully open.
pub const POSITION_OPEN: u8 = 100;

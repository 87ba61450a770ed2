//! Snapshot delivery: update sources and the single-slot channel the game
//! loop pulls from.

pub mod channel;
pub mod live;
pub mod mock;
pub mod source;

pub use channel::{ChannelStats, UpdateChannel};
pub use live::LiveServer;
pub use mock::{MockScript, MockServer};
pub use source::{Listeners, UpdateListener, UpdateSource};

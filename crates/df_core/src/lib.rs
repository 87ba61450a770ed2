pub mod error;
pub mod input;
pub mod snapshot;
pub mod time;
pub mod vector;

pub use error::ClientError;
pub use snapshot::{BulletState, KinematicState, PlayerState, Snapshot};

pub mod debug_menu;

pub use debug_menu::{DebugLine, DebugMenu};

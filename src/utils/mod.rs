//! Utility modules shared by the surfaces and the bridge.

pub mod hash;
pub mod html;
pub mod path;
pub mod plural;
pub mod size;

pub use plural::plural_count;
pub use size::format_size;

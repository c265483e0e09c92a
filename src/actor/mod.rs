//! Actor System for the live playground
//!
//! Message-passing concurrency for watch and serve mode:
//!
//! ```text
//! FsActor --> TriggerActor --> RouterActor --> watch<Frame>
//! (editor)    (debounce, run)  (stale filter)   (surfaces)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - Entry file watcher
//! - `trigger` - Debouncing and request dispatch
//! - `router` - Result routing into display frames
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod router;
pub mod trigger;

pub use coordinator::Coordinator;

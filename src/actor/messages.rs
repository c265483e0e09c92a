//! Actor Message Definitions
//!
//! ```text
//! FsActor --Seed/Edit--> TriggerActor --Started/Finished--> RouterActor --Frame--> surfaces
//! ```

use crate::bridge::InitError;
use crate::core::ExecutionResult;

// =============================================================================
// TriggerActor Messages
// =============================================================================

/// Messages to Trigger Actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerMsg {
    /// Initial source; settled immediately
    Seed(String),
    /// Source changed in the editor
    Edit(String),
    Shutdown,
}

// =============================================================================
// RouterActor Messages
// =============================================================================

/// Messages to Router Actor
#[derive(Debug, Clone)]
pub enum RouterMsg {
    /// Request `seq` was dispatched to the runtime
    Started { seq: u64 },
    /// Request `seq` resolved
    Finished { seq: u64, result: ExecutionResult },
    /// The runtime will never become ready
    InitFailed(InitError),
    Shutdown,
}

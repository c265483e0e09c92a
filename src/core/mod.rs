//! Core types - pure abstractions shared across the codebase.

mod artifact;
mod execution;
mod state;

pub use artifact::Artifact;
pub use execution::{ExecutionRequest, ExecutionResult, Failure, FailureKind};
pub use state::{is_shutdown, register_server, register_shutdown, setup_shutdown_handler};

//! Result routing: execution results to display states.

use super::state::DisplayState;
use crate::bridge::InitError;
use crate::core::{ExecutionResult, Failure};

/// Map a result onto what the preview shows.
pub fn route(result: &ExecutionResult) -> DisplayState {
    match result {
        ExecutionResult::Success { artifact } => DisplayState::Artifact(artifact.clone()),
        ExecutionResult::Failure(failure) => DisplayState::ErrorMessage(format_failure(failure)),
    }
}

/// `"{kind}: {message}"`, plus `" (line N)"` when the line is known.
pub fn format_failure(failure: &Failure) -> String {
    match failure.line {
        Some(line) => format!("{}: {} (line {})", failure.kind, failure.message, line),
        None => format!("{}: {}", failure.kind, failure.message),
    }
}

/// Tracks the newest request and drops results of older ones.
#[derive(Debug, Default)]
pub struct Router {
    latest: u64,
    state: DisplayState,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Request `seq` started. Returns whether the state changed.
    pub fn start(&mut self, seq: u64) -> bool {
        if seq < self.latest {
            return false;
        }
        self.latest = seq;
        self.state = DisplayState::Loading;
        true
    }

    /// Request `seq` resolved. Results of superseded requests are dropped.
    pub fn finish(&mut self, seq: u64, result: &ExecutionResult) -> bool {
        if seq != self.latest {
            return false;
        }
        self.state = route(result);
        true
    }

    pub fn init_failed(&mut self, err: &InitError) {
        self.state = DisplayState::ErrorMessage(format!("InitError: {err}"));
    }
}

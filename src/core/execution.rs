//! Execution request/result protocol between the trigger and the bridge.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::Artifact;

/// Immutable source snapshot taken when debouncing settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Monotonic sequence number (newer requests have larger numbers)
    pub seq: u64,
    pub source: Arc<str>,
}

impl ExecutionRequest {
    pub fn new(seq: u64, source: impl Into<Arc<str>>) -> Self {
        Self {
            seq,
            source: source.into(),
        }
    }
}

/// Outcome of exactly one [`ExecutionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Success { artifact: Artifact },
    Failure(Failure),
}

impl ExecutionResult {
    pub fn success(bytes: impl Into<Artifact>) -> Self {
        Self::Success {
            artifact: bytes.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failure(failure) => Some(failure),
            Self::Success { .. } => None,
        }
    }
}

impl From<Failure> for ExecutionResult {
    fn from(failure: Failure) -> Self {
        Self::Failure(failure)
    }
}

/// Failure category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Bridge called before initialization completed
    NotReady,
    /// Initialization failed; the runtime will never become ready
    InitError,
    /// Execution finished but the declared output channel was empty
    OutputMissing,
    /// The script raised; carries the engine's error class name
    Runtime(String),
    /// Wall-clock limit elapsed
    Timeout,
    /// Superseded by a newer request
    Cancelled,
}

impl FailureKind {
    pub fn runtime(name: impl Into<String>) -> Self {
        Self::Runtime(name.into())
    }

    pub fn label(&self) -> &str {
        match self {
            Self::NotReady => "NotReady",
            Self::InitError => "InitError",
            Self::OutputMissing => "OutputMissing",
            Self::Runtime(name) => name,
            Self::Timeout => "Timeout",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured failure of a single execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    /// Best-effort source line
    pub line: Option<u32>,
    /// Raw diagnostic text as reported by the runtime
    pub trace: Option<String>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            trace: None,
        }
    }

    pub fn not_ready() -> Self {
        Self::new(FailureKind::NotReady, "runtime is not initialized")
    }

    pub fn with_line(mut self, line: Option<u32>) -> Self {
        self.line = line;
        self
    }

    pub fn with_trace(mut self, trace: Option<String>) -> Self {
        self.trace = trace.filter(|t| !t.is_empty());
        self
    }
}

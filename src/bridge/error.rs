//! Bridge error types.

use std::path::PathBuf;

use thiserror::Error;

/// Startup failure. Leaves the bridge permanently not ready.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("resource index `{0}` is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read `{path}`: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to stage `{path}` into the sandbox: {reason}")]
    Stage { path: String, reason: String },

    #[error("package `{name}` failed to load: {reason}")]
    Package { name: String, reason: String },

    #[error("runtime failed to start: {0}")]
    Engine(String),

    #[error("runtime thread is not running")]
    Gone,
}

impl InitError {
    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Diagnostic raised by the embedded engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{class}: {message}")]
pub struct EngineFault {
    /// Error class reported by the engine (`SyntaxError`, `RuntimeError`, ...)
    pub class: String,
    /// First line of the diagnostic
    pub message: String,
    /// Structured line number, when the engine provides one
    pub line: Option<u32>,
    /// Full diagnostic text
    pub trace: Option<String>,
}

impl EngineFault {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
            line: None,
            trace: None,
        }
    }

    /// Split a multi-line diagnostic into a message and the full trace.
    pub fn from_text(class: impl Into<String>, text: &str) -> Self {
        let text = text.trim_end();
        let message = text.lines().next().unwrap_or_default().trim();
        let fault = Self::new(class, message);
        if text.contains('\n') {
            fault.with_trace(text)
        } else {
            fault
        }
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

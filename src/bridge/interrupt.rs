//! Cooperative cancellation and wall-clock limits for sandboxed runs.
//!
//! The engine polls [`Interrupt::reason`] from its instruction hook; any
//! `Some` aborts the run at the next poll.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::core::{Failure, FailureKind};

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a run was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    Cancelled,
    TimedOut,
}

impl InterruptReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::Cancelled => "execution cancelled",
            Self::TimedOut => "execution timed out",
        }
    }
}

/// Stop conditions for one run: the request's token, the bridge's halt
/// token, and an optional deadline.
#[derive(Debug, Clone)]
pub struct Interrupt {
    cancel: CancelToken,
    halt: CancelToken,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl Interrupt {
    /// Start the clock now.
    pub fn start(cancel: CancelToken, halt: CancelToken, timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            halt,
            timeout,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// An interrupt that never fires.
    pub fn never() -> Self {
        Self::start(CancelToken::new(), CancelToken::new(), None)
    }

    pub fn reason(&self) -> Option<InterruptReason> {
        if self.cancel.is_cancelled() || self.halt.is_cancelled() {
            return Some(InterruptReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(InterruptReason::TimedOut),
            _ => None,
        }
    }

    pub fn failure(&self, reason: InterruptReason) -> Failure {
        match reason {
            InterruptReason::Cancelled => Failure::new(
                FailureKind::Cancelled,
                "superseded by a newer edit",
            ),
            InterruptReason::TimedOut => Failure::new(
                FailureKind::Timeout,
                format!(
                    "execution exceeded {} ms",
                    self.timeout.unwrap_or_default().as_millis()
                ),
            ),
        }
    }
}

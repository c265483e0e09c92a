//! Runtime Bridge - sandboxed script execution on a dedicated thread.
//!
//! # Architecture
//!
//! ```text
//! async callers                    runtime thread ("vellum-runtime")
//! ─────────────                    ─────────────────────────────────
//! Bridge::execute ── Job ───────►  RuntimeHost ── Engine (Lua)
//!        ▲          (crossbeam)        │
//!        └──── ExecutionResult ◄───────┘
//!                (oneshot)
//! ```
//!
//! The interpreter is `!Send`, so it is created on and never leaves the
//! runtime thread. Jobs are processed one at a time, which serializes all
//! executions. Readiness is published on a `watch` channel:
//! `Loading -> Ready` or `Loading -> Failed(InitError)`, never back.

mod contract;
mod diagnostic;
mod engine;
mod error;
mod host;
mod interrupt;
pub mod lua;
mod resources;

#[cfg(test)]
pub(crate) mod testing;

pub use contract::OutputContract;
pub use engine::{Engine, EngineFactory, SOURCE_NAME, Slot};
pub use error::{EngineFault, InitError};
pub use interrupt::{CancelToken, Interrupt, InterruptReason};
pub use resources::{FONT_DIR, Resources};

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};

use crate::core::{ExecutionRequest, ExecutionResult, Failure, FailureKind};
use crate::{debug, log};
use host::RuntimeHost;

/// Name of the dedicated runtime thread.
const THREAD_NAME: &str = "vellum-runtime";

/// Runtime settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Resource index directory (`fonts/`, `packages/`)
    pub assets: PathBuf,
    /// Wall-clock limit per execution
    pub timeout: Option<Duration>,
    /// Interpreter memory cap in bytes
    pub memory_limit: Option<usize>,
    /// Fresh sandbox for every execution
    pub isolate: bool,
    pub contract: OutputContract,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("assets"),
            timeout: Some(Duration::from_secs(10)),
            memory_limit: Some(256 * 1024 * 1024),
            isolate: false,
            contract: OutputContract::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready,
    Failed(InitError),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

enum Job {
    Execute {
        request: ExecutionRequest,
        cancel: CancelToken,
        reply: oneshot::Sender<ExecutionResult>,
    },
    Shutdown,
}

/// Owned handle to the runtime thread.
pub struct Bridge {
    jobs: Sender<Job>,
    readiness: watch::Receiver<Readiness>,
    /// Interrupts whatever is running when the bridge stops
    halt: CancelToken,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Bridge {
    /// Start the runtime thread. Readiness starts as `Loading`.
    pub fn spawn(options: RuntimeOptions, factory: Arc<dyn EngineFactory>) -> Result<Self, InitError> {
        let (jobs_tx, jobs_rx) = unbounded();
        let (ready_tx, ready_rx) = watch::channel(Readiness::Loading);
        let halt = CancelToken::new();

        let thread_halt = halt.clone();
        let thread = std::thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || runtime_main(options, factory, jobs_rx, ready_tx, thread_halt))
            .map_err(|e| InitError::Engine(format!("failed to spawn runtime thread: {e}")))?;

        Ok(Self {
            jobs: jobs_tx,
            readiness: ready_rx,
            halt,
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Start the runtime thread and wait until it is ready.
    pub async fn initialize(
        options: RuntimeOptions,
        factory: Arc<dyn EngineFactory>,
    ) -> Result<Self, InitError> {
        let bridge = Self::spawn(options, factory)?;
        bridge.wait_ready().await?;
        Ok(bridge)
    }

    /// Resolve once readiness leaves `Loading`.
    pub async fn wait_ready(&self) -> Result<(), InitError> {
        let mut rx = self.readiness.clone();
        loop {
            let state = rx.borrow_and_update().clone();
            match state {
                Readiness::Ready => return Ok(()),
                Readiness::Failed(e) => return Err(e),
                Readiness::Loading => {}
            }
            if rx.changed().await.is_err() {
                return Err(InitError::Gone);
            }
        }
    }

    pub fn readiness(&self) -> watch::Receiver<Readiness> {
        self.readiness.clone()
    }

    /// Execute `request` in the sandbox.
    ///
    /// Short-circuits with `NotReady` while loading and with `InitError`
    /// after a failed start; the runtime is not touched in either case.
    pub async fn execute(&self, request: ExecutionRequest, cancel: CancelToken) -> ExecutionResult {
        let state = self.readiness.borrow().clone();
        match state {
            Readiness::Loading => return Failure::not_ready().into(),
            Readiness::Failed(e) => return Failure::new(FailureKind::InitError, e.to_string()).into(),
            Readiness::Ready => {}
        }

        let (reply, rx) = oneshot::channel();
        let job = Job::Execute {
            request,
            cancel,
            reply,
        };
        if self.jobs.send(job).is_err() {
            return gone();
        }
        rx.await.unwrap_or_else(|_| gone())
    }

    /// Stop the runtime thread and wait for it to exit.
    pub fn shutdown(&self) {
        self.halt.cancel();
        let _ = self.jobs.send(Job::Shutdown);
        if let Some(thread) = self.thread.lock().take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.halt.cancel();
        let _ = self.jobs.send(Job::Shutdown);
    }
}

fn gone() -> ExecutionResult {
    Failure::new(FailureKind::InitError, InitError::Gone.to_string()).into()
}

fn runtime_main(
    options: RuntimeOptions,
    factory: Arc<dyn EngineFactory>,
    jobs: Receiver<Job>,
    ready: watch::Sender<Readiness>,
    halt: CancelToken,
) {
    let timeout = options.timeout;
    let mut host = match RuntimeHost::start(options, factory) {
        Ok(host) => {
            ready.send_replace(Readiness::Ready);
            debug!("runtime"; "ready");
            host
        }
        Err(e) => {
            log!("error"; "{}", e);
            ready.send_replace(Readiness::Failed(e.clone()));
            for job in jobs.iter() {
                match job {
                    Job::Execute { reply, .. } => {
                        let _ = reply.send(Failure::new(FailureKind::InitError, e.to_string()).into());
                    }
                    Job::Shutdown => break,
                }
            }
            return;
        }
    };

    for job in jobs.iter() {
        match job {
            Job::Execute {
                request,
                cancel,
                reply,
            } => {
                let interrupt = Interrupt::start(cancel, halt.clone(), timeout);
                let result = match interrupt.reason() {
                    Some(reason) => interrupt.failure(reason).into(),
                    None => host.execute(&request, &interrupt),
                };
                let _ = reply.send(result);
            }
            Job::Shutdown => break,
        }
    }
    debug!("runtime"; "stopped");
}

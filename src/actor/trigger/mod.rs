//! Trigger Actor - turns a stream of edits into execution requests.
//!
//! ```text
//! Seed/Edit ──► Debouncer ──(settled, runtime ready)──► Bridge::execute
//!                                   │                        │
//!                                   ▼                        ▼
//!                          RouterMsg::Started       RouterMsg::Finished
//! ```
//!
//! Emission rules:
//! - nothing is emitted while the runtime is loading; the latest edit is
//!   kept and emitted once it becomes ready
//! - nothing is ever emitted after initialization failed
//! - empty source and source identical to the last request are skipped
//! - dispatching cancels the previous request's token

mod debouncer;
#[cfg(test)]
mod tests;

pub use debouncer::Debouncer;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use super::messages::{RouterMsg, TriggerMsg};
use crate::bridge::{Bridge, CancelToken, Readiness};
use crate::core::ExecutionRequest;
use crate::debug;

/// Trigger Actor - debounces edits and dispatches requests
pub struct TriggerActor {
    rx: mpsc::Receiver<TriggerMsg>,
    router_tx: mpsc::Sender<RouterMsg>,
    bridge: Arc<Bridge>,
    readiness: watch::Receiver<Readiness>,
    debouncer: Debouncer,
    /// Sequence number of the last request
    seq: u64,
    /// Source of the last request
    last_source: Option<Arc<str>>,
    /// Token of the most recent request
    in_flight: Option<CancelToken>,
    /// Initialization failure was forwarded to the router
    reported: bool,
}

impl TriggerActor {
    pub fn new(
        rx: mpsc::Receiver<TriggerMsg>,
        router_tx: mpsc::Sender<RouterMsg>,
        bridge: Arc<Bridge>,
        quiet: Duration,
    ) -> Self {
        let readiness = bridge.readiness();
        Self {
            rx,
            router_tx,
            bridge,
            readiness,
            debouncer: Debouncer::new(quiet),
            seq: 0,
            last_source: None,
            in_flight: None,
            reported: false,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let mut watching = true;
        loop {
            if self.report_failure().await.is_err() {
                break;
            }
            let ready = self.readiness.borrow().is_ready();

            tokio::select! {
                biased;
                msg = self.rx.recv() => match msg {
                    Some(TriggerMsg::Seed(source)) => self.debouncer.prime(source),
                    Some(TriggerMsg::Edit(source)) => self.debouncer.push(source),
                    Some(TriggerMsg::Shutdown) | None => break,
                },
                changed = self.readiness.changed(), if watching => {
                    // Runtime thread gone: readiness is final
                    if changed.is_err() {
                        watching = false;
                    }
                }
                _ = tokio::time::sleep(self.debouncer.sleep_duration()), if ready => {
                    if self.dispatch().await.is_err() {
                        break;
                    }
                }
            }
        }

        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        debug!("trigger"; "stopped");
    }

    /// Forward an initialization failure once.
    async fn report_failure(&mut self) -> Result<(), ()> {
        if self.reported {
            return Ok(());
        }
        let state = self.readiness.borrow().clone();
        if let Readiness::Failed(e) = state {
            self.reported = true;
            self.router_tx
                .send(RouterMsg::InitFailed(e))
                .await
                .map_err(|_| ())?;
        }
        Ok(())
    }

    /// Dispatch the settled edit, if any.
    ///
    /// Returns `Err(())` if RouterActor shut down
    async fn dispatch(&mut self) -> Result<(), ()> {
        let Some(source) = self.debouncer.take_if_ready() else {
            return Ok(());
        };

        if source.is_empty() {
            debug!("trigger"; "skip empty source");
            return Ok(());
        }
        if self.last_source.as_deref() == Some(source.as_str()) {
            debug!("trigger"; "skip unchanged source");
            return Ok(());
        }

        self.seq += 1;
        let request = ExecutionRequest::new(self.seq, source);
        self.last_source = Some(Arc::clone(&request.source));

        let token = CancelToken::new();
        if let Some(previous) = self.in_flight.replace(token.clone()) {
            previous.cancel();
        }

        let seq = request.seq;
        debug!("trigger"; "dispatch #{}", seq);
        self.router_tx
            .send(RouterMsg::Started { seq })
            .await
            .map_err(|_| ())?;

        let bridge = Arc::clone(&self.bridge);
        let router_tx = self.router_tx.clone();
        tokio::spawn(async move {
            let result = bridge.execute(request, token).await;
            let _ = router_tx.send(RouterMsg::Finished { seq, result }).await;
        });
        Ok(())
    }
}

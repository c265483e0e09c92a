use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::TriggerActor;
use crate::actor::messages::{RouterMsg, TriggerMsg};
use crate::bridge::testing::ScriptedFactory;
use crate::bridge::{Bridge, RuntimeOptions};
use crate::core::{ExecutionResult, FailureKind};

const QUIET: Duration = Duration::from_millis(1000);

struct Harness {
    tx: mpsc::Sender<TriggerMsg>,
    router_rx: mpsc::Receiver<RouterMsg>,
    factory: Arc<ScriptedFactory>,
    bridge: Arc<Bridge>,
    task: JoinHandle<()>,
    _dir: TempDir,
}

impl Harness {
    fn start(factory: ScriptedFactory) -> Self {
        let dir = TempDir::new().unwrap();
        let options = RuntimeOptions {
            assets: dir.path().to_path_buf(),
            ..RuntimeOptions::default()
        };
        let factory = Arc::new(factory);
        let bridge = Arc::new(Bridge::spawn(options, factory.clone()).unwrap());

        let (tx, rx) = mpsc::channel(32);
        let (router_tx, router_rx) = mpsc::channel(32);
        let actor = TriggerActor::new(rx, router_tx, Arc::clone(&bridge), QUIET);
        let task = tokio::spawn(actor.run());

        Self {
            tx,
            router_rx,
            factory,
            bridge,
            task,
            _dir: dir,
        }
    }

    async fn edit(&self, source: &str) {
        self.tx.send(TriggerMsg::Edit(source.into())).await.unwrap();
    }

    async fn recv(&mut self) -> RouterMsg {
        self.router_rx.recv().await.unwrap()
    }

    /// Wait for the `Finished` message of `seq`, skipping others.
    async fn finished(&mut self, seq: u64) -> ExecutionResult {
        loop {
            if let RouterMsg::Finished { seq: s, result } = self.recv().await
                && s == seq
            {
                return result;
            }
        }
    }

    async fn stop(self) {
        self.tx.send(TriggerMsg::Shutdown).await.unwrap();
        self.task.await.unwrap();
        self.bridge.shutdown();
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_emits_single_request_with_final_content() {
    let mut h = Harness::start(ScriptedFactory::default());
    h.bridge.wait_ready().await.unwrap();

    for source in ["set result 1", "set result 12", "set result 123"] {
        h.edit(source).await;
        tokio::time::advance(Duration::from_millis(300)).await;
    }

    assert!(matches!(h.recv().await, RouterMsg::Started { seq: 1 }));
    assert_eq!(h.finished(1).await, ExecutionResult::success(b"123".to_vec()));
    assert_eq!(h.factory.ran(), ["set result 123"]);
    h.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_waits_for_quiet_interval() {
    let mut h = Harness::start(ScriptedFactory::default());
    h.bridge.wait_ready().await.unwrap();

    let start = tokio::time::Instant::now();
    h.edit("set result x").await;
    assert!(matches!(h.recv().await, RouterMsg::Started { seq: 1 }));
    assert!(start.elapsed() >= QUIET);
    h.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_seed_runs_without_quiet_interval() {
    let mut h = Harness::start(ScriptedFactory::default());
    h.bridge.wait_ready().await.unwrap();

    let start = tokio::time::Instant::now();
    h.tx.send(TriggerMsg::Seed("set result seed".into())).await.unwrap();
    assert!(matches!(h.recv().await, RouterMsg::Started { seq: 1 }));
    assert!(start.elapsed() < QUIET);
    assert!(h.finished(1).await.is_success());
    h.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_request_while_not_ready() {
    let (factory, gate) = ScriptedFactory::gated();
    let mut h = Harness::start(factory);

    h.edit("set result a").await;
    h.edit("set result b").await;
    tokio::time::advance(QUIET * 5).await;
    tokio::task::yield_now().await;
    assert!(h.router_rx.try_recv().is_err());
    assert!(h.factory.ran().is_empty());

    // The pending edit goes out once the runtime is ready
    gate.send(()).unwrap();
    assert!(matches!(h.recv().await, RouterMsg::Started { seq: 1 }));
    assert!(h.finished(1).await.is_success());
    assert_eq!(h.factory.ran(), ["set result b"]);
    h.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_init_never_emits() {
    let mut h = Harness::start(ScriptedFactory::failing("no interpreter"));

    assert!(matches!(h.recv().await, RouterMsg::InitFailed(_)));
    h.edit("set result a").await;
    tokio::time::advance(QUIET * 5).await;
    tokio::task::yield_now().await;
    assert!(h.router_rx.try_recv().is_err());
    assert!(h.factory.ran().is_empty());
    h.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_skips_empty_and_unchanged_source() {
    let mut h = Harness::start(ScriptedFactory::default());
    h.bridge.wait_ready().await.unwrap();

    h.edit("set result a").await;
    assert!(h.finished(1).await.is_success());

    h.edit("set result a").await;
    tokio::time::advance(QUIET * 2).await;
    h.edit("").await;
    tokio::time::advance(QUIET * 2).await;
    tokio::task::yield_now().await;
    assert!(h.router_rx.try_recv().is_err());

    h.edit("set result b").await;
    assert!(matches!(h.recv().await, RouterMsg::Started { seq: 2 }));
    assert!(h.finished(2).await.is_success());
    assert_eq!(h.factory.ran(), ["set result a", "set result b"]);
    h.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_whitespace_source_is_dispatched() {
    let mut h = Harness::start(ScriptedFactory::default());
    h.bridge.wait_ready().await.unwrap();

    h.edit("  ").await;
    assert!(matches!(h.recv().await, RouterMsg::Started { seq: 1 }));
    h.finished(1).await;
    assert_eq!(h.factory.ran(), ["  "]);
    h.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_new_request_cancels_previous() {
    let mut h = Harness::start(ScriptedFactory::default());
    h.bridge.wait_ready().await.unwrap();

    h.edit("spin").await;
    assert!(matches!(h.recv().await, RouterMsg::Started { seq: 1 }));

    h.edit("set result done").await;
    let mut results = std::collections::BTreeMap::new();
    while results.len() < 2 {
        if let RouterMsg::Finished { seq, result } = h.recv().await {
            results.insert(seq, result);
        }
    }
    assert_eq!(results[&1].failure().unwrap().kind, FailureKind::Cancelled);
    assert_eq!(results[&2], ExecutionResult::success(b"done".to_vec()));
    h.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_actor() {
    let h = Harness::start(ScriptedFactory::default());
    h.stop().await;
}

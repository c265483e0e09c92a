//! Actor Coordinator - wires up the playground actor system.
//!
//! The Coordinator is a thin orchestrator that:
//! - starts the runtime bridge
//! - creates communication channels
//! - runs the actors until shutdown

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::{mpsc, watch};

use super::fs::FsActor;
use super::messages::{RouterMsg, TriggerMsg};
use super::router::RouterActor;
use super::trigger::TriggerActor;
use crate::bridge::lua::LuaFactory;
use crate::bridge::{Bridge, EngineFactory, RuntimeOptions};
use crate::debug;
use crate::display::Frame;

const CHANNEL_BUFFER: usize = 32;

/// How long actors get to drain after shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    entry: PathBuf,
    options: RuntimeOptions,
    quiet: Duration,
    factory: Arc<dyn EngineFactory>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    /// Coordinator for `entry` backed by the Lua engine.
    pub fn new(entry: PathBuf, options: RuntimeOptions, quiet: Duration) -> Self {
        let factory = Arc::new(LuaFactory::new(options.memory_limit));
        Self {
            entry,
            options,
            quiet,
            factory,
            shutdown_rx: None,
        }
    }

    /// Replace the engine factory.
    pub fn with_factory(mut self, factory: Arc<dyn EngineFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system, publishing every display change on `frames`.
    ///
    /// Returns once the shutdown signal fires, or when the editor stops if
    /// no signal was set.
    pub async fn run(self, frames: watch::Sender<Frame>) -> Result<()> {
        let (trigger_tx, trigger_rx) = mpsc::channel::<TriggerMsg>(CHANNEL_BUFFER);
        let (router_tx, router_rx) = mpsc::channel::<RouterMsg>(CHANNEL_BUFFER);

        // Bridge starts loading before the watcher, so the seed waits less
        let bridge = Arc::new(Bridge::spawn(self.options, self.factory)?);

        let fs_actor = FsActor::new(self.entry, trigger_tx.clone())
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
        let trigger_actor = TriggerActor::new(trigger_rx, router_tx.clone(), bridge.clone(), self.quiet);
        let router_actor = RouterActor::new(router_rx, frames);

        debug!("actor"; "start");
        let router_handle = tokio::spawn(router_actor.run());
        let trigger_handle = tokio::spawn(trigger_actor.run());
        let mut fs_handle = tokio::spawn(fs_actor.run());

        if let Some(rx) = self.shutdown_rx {
            loop {
                if rx.try_recv().is_ok() {
                    debug!("actor"; "shutdown signal received");
                    break;
                }
                if fs_handle.is_finished() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        } else {
            let _ = (&mut fs_handle).await;
        }

        fs_handle.abort();
        let _ = trigger_tx.send(TriggerMsg::Shutdown).await;
        let _ = tokio::time::timeout(DRAIN_TIMEOUT, trigger_handle).await;
        let _ = router_tx.send(RouterMsg::Shutdown).await;
        let _ = tokio::time::timeout(DRAIN_TIMEOUT, router_handle).await;

        let _ = tokio::task::spawn_blocking(move || bridge.shutdown()).await;
        debug!("actor"; "stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::ScriptedFactory;
    use crate::display::DisplayState;
    use tempfile::TempDir;

    async fn wait_for(
        frames: &mut watch::Receiver<Frame>,
        pred: impl Fn(&DisplayState) -> bool,
    ) -> DisplayState {
        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                let state = frames.borrow_and_update().state.clone();
                if pred(&state) {
                    return state;
                }
                frames.changed().await.unwrap();
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_seed_reaches_frames() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        let entry = dir.path().join("main.lua");
        std::fs::write(&entry, "set result %PDF-1.7").unwrap();

        let options = RuntimeOptions {
            assets: dir.path().join("assets"),
            ..RuntimeOptions::default()
        };
        let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
        let coordinator = Coordinator::new(entry, options, Duration::from_millis(50))
            .with_factory(Arc::new(ScriptedFactory::default()))
            .with_shutdown_signal(shutdown_rx);

        let (frames_tx, mut frames) = watch::channel(Frame::default());
        let task = tokio::spawn(coordinator.run(frames_tx));

        let state = wait_for(&mut frames, |s| s.artifact().is_some()).await;
        assert_eq!(state.artifact().unwrap().as_bytes(), b"%PDF-1.7");

        shutdown_tx.send(()).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_missing_assets_shows_init_error() {
        let dir = TempDir::new().unwrap();
        let entry = dir.path().join("main.lua");
        std::fs::write(&entry, "set result x").unwrap();

        let options = RuntimeOptions {
            assets: dir.path().join("missing"),
            ..RuntimeOptions::default()
        };
        let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
        let coordinator = Coordinator::new(entry, options, Duration::from_millis(50))
            .with_factory(Arc::new(ScriptedFactory::default()))
            .with_shutdown_signal(shutdown_rx);

        let (frames_tx, mut frames) = watch::channel(Frame::default());
        let task = tokio::spawn(coordinator.run(frames_tx));

        let state = wait_for(&mut frames, |s| matches!(s, DisplayState::ErrorMessage(_))).await;
        let DisplayState::ErrorMessage(message) = state else {
            unreachable!()
        };
        assert!(message.starts_with("InitError:"), "{message}");

        shutdown_tx.send(()).unwrap();
        task.await.unwrap().unwrap();
    }
}

//! Terminal surface: renders frames as a single status block and keeps the
//! document file at `output.path` in sync with the preview.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel;
use tokio::sync::watch;

use super::common::{actor_runtime, describe, display_name, write_artifact};
use crate::actor::Coordinator;
use crate::config::PlaygroundConfig;
use crate::core::register_shutdown;
use crate::display::{DisplayState, Frame};
use crate::log;
use crate::logger::{status_error, status_pending, status_success, status_unchanged};

/// How long the surface may lag behind the actors at exit.
const SURFACE_DRAIN: Duration = Duration::from_millis(200);

/// What a frame turned into on the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Nothing,
    Pending,
    Written(String),
    Unchanged,
    Error(String),
}

/// Terminal rendering of frames.
pub struct TerminalSurface {
    entry: String,
    output: PathBuf,
    output_label: String,
    /// Fingerprint of the last artifact written
    written: Option<String>,
}

impl TerminalSurface {
    pub fn new(config: &PlaygroundConfig) -> Self {
        Self {
            entry: display_name(&config.source.entry),
            output: config.output.path.clone(),
            output_label: config.root_relative(&config.output.path).display().to_string(),
            written: None,
        }
    }

    /// Render every frame until the publisher goes away.
    pub async fn run(mut self, mut frames: watch::Receiver<Frame>) {
        while frames.changed().await.is_ok() {
            let frame = frames.borrow_and_update().clone();
            self.show(&frame.state);
        }
    }

    /// Apply one state: write the artifact if it is new and print the
    /// status block.
    pub fn show(&mut self, state: &DisplayState) -> Shown {
        let shown = self.apply(state);
        match &shown {
            Shown::Nothing => {}
            Shown::Pending => status_pending(&format!("executing {}", self.entry)),
            Shown::Written(detail) => status_success(&format!(
                "{} -> {} ({})",
                self.entry, self.output_label, detail
            )),
            Shown::Unchanged => status_unchanged(&format!("{} unchanged", self.entry)),
            Shown::Error(detail) => status_error(&format!("{} failed", self.entry), detail),
        }
        shown
    }

    fn apply(&mut self, state: &DisplayState) -> Shown {
        match state {
            DisplayState::Idle => Shown::Nothing,
            DisplayState::Loading => Shown::Pending,
            DisplayState::Artifact(artifact) => {
                let fingerprint = artifact.fingerprint();
                if self.written.as_deref() == Some(fingerprint.as_str()) {
                    return Shown::Unchanged;
                }
                match write_artifact(&self.output, artifact) {
                    Ok(()) => {
                        self.written = Some(fingerprint);
                        Shown::Written(describe(artifact))
                    }
                    Err(e) => {
                        self.written = None;
                        Shown::Error(format!("{e:#}"))
                    }
                }
            }
            DisplayState::ErrorMessage(message) => {
                self.written = None;
                Shown::Error(message.clone())
            }
        }
    }
}

/// Live loop with the terminal surface until Ctrl+C.
pub fn watch_project(config: &PlaygroundConfig) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_shutdown(shutdown_tx);

    config.log_summary();
    log!("watch"; "waiting for edits, press Ctrl+C to stop");

    let rt = actor_runtime()?;
    rt.block_on(async {
        let (frames_tx, frames_rx) = watch::channel(Frame::default());
        let surface = tokio::spawn(TerminalSurface::new(config).run(frames_rx));

        let coordinator = Coordinator::new(
            config.source.entry.clone(),
            config.runtime_options(),
            config.trigger.quiet(),
        )
        .with_shutdown_signal(shutdown_rx);
        let result = coordinator.run(frames_tx).await;

        let _ = tokio::time::timeout(SURFACE_DRAIN, surface).await;
        result
    })
}

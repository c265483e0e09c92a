//! FileSystem Actor - the editor surface.
//!
//! Watches the entry source file and forwards its content to the
//! TriggerActor: the initial content as `Seed`, later content as `Edit`.
//!
//! The parent directory is watched instead of the file itself, so editors
//! that save atomically (write temp file, rename over) are still seen.
//!
//! ```text
//! notify (thread) → std mpsc → relay thread → tokio mpsc → FsActor → TriggerMsg
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::TriggerMsg;
use crate::{debug, log};

/// FileSystem Actor - watches the entry file
pub struct FsActor {
    entry: PathBuf,
    file_name: OsString,
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    trigger_tx: mpsc::Sender<TriggerMsg>,
}

impl FsActor {
    /// Start watching immediately; events buffer until [`FsActor::run`].
    pub fn new(entry: PathBuf, trigger_tx: mpsc::Sender<TriggerMsg>) -> notify::Result<Self> {
        let file_name = entry
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| notify::Error::generic("entry has no file name"))?;
        let dir = match entry.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            entry,
            file_name,
            notify_rx,
            _watcher: watcher,
            trigger_tx,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Poll notify events on a thread and relay them to the async side
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => log!("watch"; "notify error: {}", e),
                }
            }
        });

        let mut last = read_source(&self.entry);
        let seed = last.clone().unwrap_or_default();
        if self.trigger_tx.send(TriggerMsg::Seed(seed)).await.is_err() {
            return;
        }

        while let Some(event) = async_rx.recv().await {
            if !touches(&event, &self.file_name) {
                continue;
            }
            debug!("watch"; "{:?} {}", event.kind, self.entry.display());

            let Some(source) = read_source(&self.entry) else {
                continue;
            };
            if last.as_deref() == Some(source.as_str()) {
                continue;
            }
            last = Some(source.clone());
            if self.trigger_tx.send(TriggerMsg::Edit(source)).await.is_err() {
                break;
            }
        }
        debug!("watch"; "stopped");
    }
}

/// Content changes to a file named `file_name`. Metadata-only changes and
/// removals are ignored (a removal followed by a create is a save).
fn touches(event: &notify::Event, file_name: &OsString) -> bool {
    let relevant = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    };
    relevant
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

fn read_source(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(e) => {
            log!("watch"; "cannot read {}: {}", path.display(), e);
            None
        }
    }
}

//! Router Actor - publishes display frames.
//!
//! Receives request lifecycle messages from the TriggerActor, filters
//! stale results through [`Router`] and publishes every change as a new
//! [`Frame`] on a `watch` channel that all surfaces read from.

use tokio::sync::{mpsc, watch};

use super::messages::RouterMsg;
use crate::debug;
use crate::display::{Frame, Router};

/// Router Actor - single writer of the current frame
pub struct RouterActor {
    rx: mpsc::Receiver<RouterMsg>,
    frames: watch::Sender<Frame>,
    router: Router,
    revision: u64,
}

impl RouterActor {
    pub fn new(rx: mpsc::Receiver<RouterMsg>, frames: watch::Sender<Frame>) -> Self {
        Self {
            rx,
            frames,
            router: Router::new(),
            revision: 0,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            let changed = match msg {
                RouterMsg::Started { seq } => self.router.start(seq),
                RouterMsg::Finished { seq, result } => {
                    let applied = self.router.finish(seq, &result);
                    if !applied {
                        debug!("router"; "discard stale result #{}", seq);
                    }
                    applied
                }
                RouterMsg::InitFailed(err) => {
                    self.router.init_failed(&err);
                    true
                }
                RouterMsg::Shutdown => break,
            };
            if changed {
                self.publish();
            }
        }
        debug!("router"; "stopped");
    }

    fn publish(&mut self) {
        self.revision += 1;
        self.frames.send_replace(Frame {
            revision: self.revision,
            state: self.router.state().clone(),
        });
    }
}

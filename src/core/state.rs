//! Process-wide shutdown state.
//!
//! Only the Ctrl+C path is global: the runtime bridge and the actors are
//! owned values wired up by the coordinator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for actor system
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The handler behavior depends on what has been registered:
/// - Nothing registered: exit immediately (nothing to clean up)
/// - Actor system registered: notify it, unblock the HTTP server if any
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        let Some(tx) = SHUTDOWN_TX.get() else {
            std::process::exit(0);
        };

        crate::log!("vellum"; "shutting down...");
        let _ = tx.send(());

        if let Some(server) = SERVER.get() {
            server.unblock();
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the actor system's shutdown channel
pub fn register_shutdown(shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Register the HTTP server so Ctrl+C can unblock its request loop
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

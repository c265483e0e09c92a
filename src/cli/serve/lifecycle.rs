//! Server lifecycle management.

use crate::{
    actor::Coordinator,
    cli::watch::TerminalSurface,
    config::PlaygroundConfig,
    core::{register_server, register_shutdown},
    display::Frame,
    log,
};
use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use std::{
    net::SocketAddr,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::Server;
use tokio::sync::watch;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
///
/// Returns the address actually bound, so port 0 resolves to the port the
/// OS picked.
pub fn bind_with_retry(interface: std::net::IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        match Server::http(SocketAddr::new(interface, port)) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let addr = server
                    .server_addr()
                    .to_ip()
                    .unwrap_or_else(|| SocketAddr::new(interface, port));
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map_or_else(String::new, |e| e.to_string())
    ))
}

/// Register server for graceful shutdown.
///
/// When Ctrl+C is pressed, the global handler unblocks the server and
/// notifies the actors.
pub fn register_for_shutdown(server: Arc<Server>, shutdown_tx: Sender<()>) {
    register_server(server);
    register_shutdown(shutdown_tx);
}

/// Spawn the actor system and the terminal surface on their own thread.
///
/// If the actors fail to start, the server is unblocked so `serve` exits.
pub fn spawn_actors(
    config: PlaygroundConfig,
    frames: watch::Sender<Frame>,
    shutdown_rx: Receiver<()>,
    server: Arc<Server>,
) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("vellum-actors".into())
        .spawn(move || {
            if let Err(e) = run_actor_system(&config, frames, shutdown_rx) {
                log!("actor"; "error: {:#}", e);
                server.unblock();
            }
        })?;
    Ok(handle)
}

fn run_actor_system(
    config: &PlaygroundConfig,
    frames: watch::Sender<Frame>,
    shutdown_rx: Receiver<()>,
) -> Result<()> {
    let rt = crate::cli::common::actor_runtime()?;
    rt.block_on(async {
        let surface = tokio::spawn(TerminalSurface::new(config).run(frames.subscribe()));
        let coordinator = Coordinator::new(
            config.source.entry.clone(),
            config.runtime_options(),
            config.trigger.quiet(),
        )
        .with_shutdown_signal(shutdown_rx);
        let result = coordinator.run(frames).await;
        surface.abort();
        result
    })
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, TcpListener};

    #[test]
    fn test_bind_reports_actual_port() {
        let (_server, addr) = bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_bind_skips_taken_port() {
        let taken = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = taken.local_addr().unwrap().port();
        let (_server, addr) = bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), port).unwrap();
        assert_ne!(addr.port(), port);
    }
}

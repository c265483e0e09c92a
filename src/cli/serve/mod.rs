//! Live preview server.
//!
//! ```text
//! GET /               preview page (polls /status, reloads on change)
//! GET /status         current frame as JSON
//! GET /artifact.pdf   artifact bytes (?download for an attachment)
//! ```

mod lifecycle;
mod page;
mod response;

use crate::{config::PlaygroundConfig, display::Frame, log};
use anyhow::{Context, Result};
use crossbeam::channel;
use page::{Preview, ViewerQuery, url_path};
use response::Reply;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Method, Request, Server};
use tokio::sync::watch;

/// Request handler threads
const REQUEST_THREADS: usize = 4;

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop.
pub fn bind_server(config: &PlaygroundConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the actors and the request loop (blocking until Ctrl+C).
    pub fn run(self, config: &PlaygroundConfig) -> Result<()> {
        let (frames_tx, frames_rx) = watch::channel(Frame::default());
        let preview = Arc::new(Preview {
            frames: frames_rx,
            title: crate::cli::common::display_name(&config.source.entry),
            download_name: config.output.download_name.clone(),
        });

        config.log_summary();
        let actor_handle = lifecycle::spawn_actors(
            config.clone(),
            frames_tx,
            self.shutdown_rx,
            Arc::clone(&self.server),
        )?;
        run_request_loop(&self.server, &preview)?;
        lifecycle::wait_for_shutdown(actor_handle);
        Ok(())
    }
}

/// Bind and serve until Ctrl+C.
pub fn serve_project(config: &PlaygroundConfig) -> Result<()> {
    bind_server(config)?.run(config)
}

fn run_request_loop(server: &Server, preview: &Arc<Preview>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("Failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let preview = Arc::clone(preview);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &preview) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, preview: &Preview) -> Result<()> {
    let reply = if crate::core::is_shutdown() {
        response::unavailable()
    } else {
        route(request.method(), request.url(), preview)
    };
    response::send(request, reply)
}

fn route(method: &Method, url: &str, preview: &Preview) -> Reply {
    if !matches!(method, Method::Get | Method::Head) {
        return response::method_not_allowed();
    }
    let query = ViewerQuery::parse(url);
    match url_path(url) {
        "/" | "/index.html" => response::preview_page(preview, query),
        "/status" => response::status(preview),
        "/artifact.pdf" => response::artifact(preview, query),
        _ => response::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Artifact;
    use crate::display::DisplayState;
    use std::io::{Read, Write};
    use std::net::{IpAddr, Ipv4Addr, TcpStream};

    fn preview(state: DisplayState) -> (watch::Sender<Frame>, Preview) {
        let (tx, frames) = watch::channel(Frame { revision: 3, state });
        let preview = Preview {
            frames,
            title: "main.lua".into(),
            download_name: "report.pdf".into(),
        };
        (tx, preview)
    }

    fn header<'a>(reply: &'a Reply, key: &str) -> Option<&'a str> {
        reply
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_routes() {
        let (_tx, preview) = preview(DisplayState::Idle);
        assert_eq!(route(&Method::Get, "/", &preview).status, 200);
        assert_eq!(route(&Method::Head, "/status", &preview).status, 200);
        assert_eq!(route(&Method::Get, "/nope", &preview).status, 404);
        assert_eq!(route(&Method::Post, "/", &preview).status, 405);
        // No document yet
        assert_eq!(route(&Method::Get, "/artifact.pdf", &preview).status, 404);
    }

    #[test]
    fn test_status_json() {
        let (_tx, preview) = preview(DisplayState::ErrorMessage("SyntaxError: x (line 1)".into()));
        let reply = route(&Method::Get, "/status", &preview);
        let json: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(json["revision"], 3);
        assert_eq!(json["state"], "error");
        assert_eq!(json["message"], "SyntaxError: x (line 1)");
    }

    #[test]
    fn test_artifact_headers() {
        let artifact = Artifact::from(b"%PDF-1.4 bytes".to_vec());
        let (_tx, preview) = preview(DisplayState::Artifact(artifact.clone()));

        let reply = route(&Method::Get, "/artifact.pdf?download", &preview);
        assert_eq!(reply.body, artifact.as_bytes());
        assert_eq!(reply.content_type, response::mime::PDF);
        assert_eq!(
            header(&reply, "Content-Disposition"),
            Some("attachment; filename=\"report.pdf\"")
        );
        let etag = format!("\"{}\"", artifact.fingerprint());
        assert_eq!(header(&reply, "ETag"), Some(etag.as_str()));

        let reply = route(&Method::Get, "/artifact.pdf?rev=3", &preview);
        assert!(header(&reply, "Content-Disposition").unwrap().starts_with("inline"));
    }

    #[test]
    fn test_frames_update_live() {
        let (tx, preview) = preview(DisplayState::Loading);
        assert_eq!(route(&Method::Get, "/artifact.pdf", &preview).status, 404);

        tx.send_replace(Frame {
            revision: 4,
            state: DisplayState::Artifact(Artifact::from(b"%PDF".to_vec())),
        });
        assert_eq!(route(&Method::Get, "/artifact.pdf", &preview).status, 200);
    }

    /// Raw HTTP/1.1 exchange; returns (status line, body).
    fn fetch(addr: SocketAddr, method: &str, path: &str) -> (String, Vec<u8>) {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).unwrap();

        let split = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
        let head = String::from_utf8_lossy(&raw[..split]).into_owned();
        let status = head.lines().next().unwrap().to_string();
        (status, raw[split + 4..].to_vec())
    }

    #[test]
    fn test_artifact_bytes_over_http() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let (_tx, preview) = preview(DisplayState::Artifact(Artifact::from(bytes.clone())));
        let preview = Arc::new(preview);

        let (server, addr) =
            lifecycle::bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        let server = Arc::new(server);
        let loop_server = Arc::clone(&server);
        let loop_preview = Arc::clone(&preview);
        let handle = std::thread::spawn(move || run_request_loop(&loop_server, &loop_preview));

        let (status, body) = fetch(addr, "GET", "/artifact.pdf");
        assert!(status.contains("200"), "{status}");
        assert_eq!(body, bytes);

        let (status, body) = fetch(addr, "HEAD", "/artifact.pdf");
        assert!(status.contains("200"), "{status}");
        assert!(body.is_empty());

        let (status, _) = fetch(addr, "GET", "/missing");
        assert!(status.contains("404"), "{status}");

        server.unblock();
        handle.join().unwrap().unwrap();
    }
}

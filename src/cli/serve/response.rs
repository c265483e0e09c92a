//! HTTP response handlers.
//!
//! Handlers build a [`Reply`]; [`send`] turns it into a tiny_http response.
//! tiny_http drops the body of `HEAD` responses and keeps the headers.

use anyhow::{Result, anyhow};
use tiny_http::{Header, Request, Response, StatusCode};

use super::page::{Preview, ViewerQuery};

pub mod mime {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const PDF: &str = "application/pdf";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
}

/// A response before it is written to the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            headers: vec![("Cache-Control", "no-store".into())],
            body: body.into(),
        }
    }

    fn with_header(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((key, value.into()));
        self
    }
}

/// `GET /` - the preview page.
pub fn preview_page(preview: &Preview, query: ViewerQuery) -> Reply {
    Reply::new(200, mime::HTML, preview.render(query))
}

/// `GET /status` - the current frame as JSON.
pub fn status(preview: &Preview) -> Reply {
    let frame = preview.frame();
    match serde_json::to_vec(&frame.summary()) {
        Ok(body) => Reply::new(200, mime::JSON, body),
        Err(e) => Reply::new(500, mime::PLAIN, e.to_string()),
    }
}

/// `GET /artifact.pdf` - the exact artifact bytes.
pub fn artifact(preview: &Preview, query: ViewerQuery) -> Reply {
    let frame = preview.frame();
    let Some(artifact) = frame.state.artifact() else {
        return Reply::new(404, mime::PLAIN, "no document yet");
    };
    let disposition = if query.download { "attachment" } else { "inline" };
    Reply::new(200, mime::PDF, artifact.as_bytes())
        .with_header(
            "Content-Disposition",
            format!("{disposition}; filename=\"{}\"", preview.download_name),
        )
        .with_header("ETag", format!("\"{}\"", artifact.fingerprint()))
}

pub fn not_found() -> Reply {
    Reply::new(404, mime::PLAIN, "404 Not Found")
}

pub fn method_not_allowed() -> Reply {
    Reply::new(405, mime::PLAIN, "405 Method Not Allowed").with_header("Allow", "GET, HEAD")
}

/// Server is shutting down.
pub fn unavailable() -> Reply {
    Reply::new(503, mime::PLAIN, "503 Service Unavailable")
}

/// Write `reply` to the client.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let mut headers = vec![make_header("Content-Type", reply.content_type)?];
    for (key, value) in &reply.headers {
        headers.push(make_header(key, value)?);
    }

    let mut response = Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
    for header in headers {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header {key}: {value}"))
}

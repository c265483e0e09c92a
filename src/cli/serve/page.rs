//! Preview page rendering.

use std::fmt::Write;

use percent_encoding::percent_decode_str;
use tokio::sync::watch;

use crate::display::{ArtifactViewer, DisplayState, Frame};
use crate::embed::serve::{PREVIEW_HTML, PreviewVars};
use crate::utils::html::escape;

/// Viewer position requested in the query string (`?page=2&zoom=1.5`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewerQuery {
    pub page: Option<i64>,
    pub zoom: Option<f32>,
    pub download: bool,
}

impl ViewerQuery {
    /// Parse the query part of a request URL. Unknown keys and malformed
    /// values are ignored.
    pub fn parse(url: &str) -> Self {
        let mut query = Self::default();
        let Some((_, raw)) = url.split_once('?') else {
            return query;
        };
        for pair in raw.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = percent_decode_str(value).decode_utf8_lossy();
            match key {
                "page" => query.page = value.trim().parse().ok(),
                "zoom" => query.zoom = value.trim().parse().ok(),
                "download" => query.download = true,
                _ => {}
            }
        }
        query
    }
}

/// Path of a request URL without its query.
pub fn url_path(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// Everything the HTTP surface reads: the current frame and display names.
#[derive(Clone)]
pub struct Preview {
    pub frames: watch::Receiver<Frame>,
    pub title: String,
    pub download_name: String,
}

impl Preview {
    pub fn frame(&self) -> Frame {
        self.frames.borrow().clone()
    }

    /// Render the preview page for the current frame.
    pub fn render(&self, query: ViewerQuery) -> String {
        let frame = self.frame();
        let (nav, body) = match &frame.state {
            DisplayState::Idle => (String::new(), notice("Waiting for the first run...")),
            DisplayState::Loading => (String::new(), notice("Executing...")),
            DisplayState::ErrorMessage(message) => (
                String::new(),
                format!("<div class=\"notice\"><pre class=\"error\">{}</pre></div>", escape(message)),
            ),
            DisplayState::Artifact(artifact) => {
                let mut viewer = ArtifactViewer::new(artifact.clone(), self.download_name.as_str());
                viewer.set_page(query.page.unwrap_or(1));
                if let Some(zoom) = query.zoom {
                    viewer.set_zoom(zoom);
                }
                (render_nav(&viewer), render_document(&viewer, frame.revision))
            }
        };

        PREVIEW_HTML.render(&PreviewVars {
            title: &escape(&self.title),
            state: frame.state.label(),
            revision: frame.revision,
            nav: &nav,
            body: &body,
        })
    }
}

fn notice(text: &str) -> String {
    format!("<p class=\"notice\">{}</p>", escape(text))
}

fn viewer_link(page: usize, zoom: f32) -> String {
    format!("/?page={page}&amp;zoom={zoom:.1}")
}

/// Link when enabled, greyed-out label otherwise.
fn nav_item(out: &mut String, enabled: bool, href: &str, label: &str) {
    if enabled {
        let _ = write!(out, "<a href=\"{href}\">{label}</a>");
    } else {
        let _ = write!(out, "<span class=\"off\">{label}</span>");
    }
}

fn render_nav(viewer: &ArtifactViewer) -> String {
    let page = viewer.page();
    let zoom = viewer.zoom();

    let mut zoomed_in = viewer.clone();
    zoomed_in.zoom_in();
    let mut zoomed_out = viewer.clone();
    zoomed_out.zoom_out();

    let mut out = String::from("<nav>");
    nav_item(&mut out, viewer.has_prev(), &viewer_link(page.saturating_sub(1), zoom), "&larr;");
    let _ = write!(out, "<span>page {} / {}</span>", page, viewer.page_count());
    nav_item(&mut out, viewer.has_next(), &viewer_link(page + 1, zoom), "&rarr;");
    nav_item(
        &mut out,
        zoomed_out.zoom_percent() != viewer.zoom_percent(),
        &viewer_link(page, zoomed_out.zoom()),
        "&minus;",
    );
    let _ = write!(out, "<span>{}%</span>", viewer.zoom_percent());
    nav_item(
        &mut out,
        zoomed_in.zoom_percent() != viewer.zoom_percent(),
        &viewer_link(page, zoomed_in.zoom()),
        "+",
    );
    let _ = write!(
        out,
        "<a href=\"/artifact.pdf?download\" download=\"{}\">download</a>",
        escape(viewer.download_name())
    );
    out.push_str("</nav>");
    out
}

fn render_document(viewer: &ArtifactViewer, revision: u64) -> String {
    format!(
        "<embed type=\"application/pdf\" src=\"/artifact.pdf?rev={}#page={}&amp;zoom={}\">",
        revision,
        viewer.page(),
        viewer.zoom_percent()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Artifact;

    fn preview(state: DisplayState) -> Preview {
        let (_tx, frames) = watch::channel(Frame { revision: 7, state });
        Preview {
            frames,
            title: "main.lua".into(),
            download_name: "doc.pdf".into(),
        }
    }

    fn five_pages() -> Artifact {
        Artifact::from("%PDF /Type /Page /Type /Page /Type /Page /Type /Page /Type /Page ".as_bytes())
    }

    #[test]
    fn test_parse_query() {
        let query = ViewerQuery::parse("/?page=3&zoom=1.5&x=1");
        assert_eq!(query.page, Some(3));
        assert_eq!(query.zoom, Some(1.5));
        assert!(!query.download);

        assert_eq!(ViewerQuery::parse("/"), ViewerQuery::default());
        assert_eq!(ViewerQuery::parse("/?page=abc").page, None);
        assert!(ViewerQuery::parse("/artifact.pdf?download").download);
        assert_eq!(ViewerQuery::parse("/?page=%32").page, Some(2));
    }

    #[test]
    fn test_url_path() {
        assert_eq!(url_path("/status?x=1"), "/status");
        assert_eq!(url_path("/"), "/");
    }

    #[test]
    fn test_page_clamped_to_document() {
        let html = preview(DisplayState::Artifact(five_pages())).render(ViewerQuery {
            page: Some(9),
            ..ViewerQuery::default()
        });
        assert!(html.contains("page 5 / 5"));
        assert!(html.contains("#page=5&amp;zoom=100"));
        // Last page: next is disabled, prev links to page 4
        assert!(html.contains("<span class=\"off\">&rarr;</span>"));
        assert!(html.contains("href=\"/?page=4&amp;zoom=1.0\""));

        let html = preview(DisplayState::Artifact(five_pages())).render(ViewerQuery {
            page: Some(-3),
            ..ViewerQuery::default()
        });
        assert!(html.contains("page 1 / 5"));
        assert!(html.contains("<span class=\"off\">&larr;</span>"));
    }

    #[test]
    fn test_zoom_clamped() {
        let html = preview(DisplayState::Artifact(five_pages())).render(ViewerQuery {
            zoom: Some(9.0),
            ..ViewerQuery::default()
        });
        assert!(html.contains("<span>300%</span>"));
        assert!(html.contains("<span class=\"off\">+</span>"));
    }

    #[test]
    fn test_error_escaped() {
        let html = preview(DisplayState::ErrorMessage("RuntimeError: <boom> (line 2)".into()))
            .render(ViewerQuery::default());
        assert!(html.contains("RuntimeError: &lt;boom&gt; (line 2)"));
        assert!(html.contains("const revision = 7;"));
        assert!(!html.contains("<embed"));
    }

    #[test]
    fn test_loading_notice() {
        let html = preview(DisplayState::Loading).render(ViewerQuery::default());
        assert!(html.contains("Executing..."));
        assert!(html.contains("<span class=\"state\">loading</span>"));
    }
}

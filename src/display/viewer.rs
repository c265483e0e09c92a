//! Artifact viewer: page navigation and zoom over opaque document bytes.
//!
//! The only thing read from the artifact is its page count, taken from
//! PDF page objects (`/Type /Page`, not `/Type /Pages`).

use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::core::Artifact;

/// `/Type /Page` followed by anything but the `s` of `/Pages`.
static PAGE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)/Type\s*/Page(?:[^s]|$)").expect("valid regex"));

/// Zoom bounds and granularity, in tenths.
const ZOOM_MIN: u32 = 5;
const ZOOM_MAX: u32 = 30;
const ZOOM_DEFAULT: u32 = 10;

/// Number of pages in a document; at least 1.
pub fn count_pages(bytes: &[u8]) -> usize {
    PAGE_OBJECT.find_iter(bytes).count().max(1)
}

#[derive(Debug, Clone)]
pub struct ArtifactViewer {
    artifact: Artifact,
    page_count: usize,
    page: usize,
    /// Zoom in tenths (10 = 100%)
    zoom: u32,
    download_name: String,
}

impl ArtifactViewer {
    pub fn new(artifact: Artifact, download_name: impl Into<String>) -> Self {
        let page_count = count_pages(artifact.as_bytes());
        Self {
            artifact,
            page_count,
            page: 1,
            zoom: ZOOM_DEFAULT,
            download_name: download_name.into(),
        }
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Current page, 1-based.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn zoom(&self) -> f32 {
        self.zoom as f32 / 10.0
    }

    /// Zoom as a whole percentage.
    pub fn zoom_percent(&self) -> u32 {
        self.zoom * 10
    }

    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    /// Jump to `page`, clamped to `[1, page_count]`.
    pub fn set_page(&mut self, page: i64) {
        self.page = page.clamp(1, self.page_count as i64) as usize;
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page as i64 + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page as i64 - 1);
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Set zoom, rounded to 0.1 and clamped to `[0.5, 3.0]`.
    pub fn set_zoom(&mut self, zoom: f32) {
        if !zoom.is_finite() {
            return;
        }
        let tenths = (zoom * 10.0).round().clamp(ZOOM_MIN as f32, ZOOM_MAX as f32);
        self.zoom = tenths as u32;
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(ZOOM_MAX);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(ZOOM_MIN);
    }
}

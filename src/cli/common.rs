//! Common utilities shared across CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::Artifact;
use crate::display::count_pages;
use crate::utils::{format_size, plural_count};

/// Build the tokio runtime that hosts the actors.
pub fn actor_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

/// Read the entry script.
pub fn read_entry(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read entry '{}'", path.display()))
}

/// Write the artifact bytes, creating parent directories.
pub fn write_artifact(path: &Path, artifact: &Artifact) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    fs::write(path, artifact.as_bytes())
        .with_context(|| format!("Failed to write '{}'", path.display()))
}

/// `"3 pages, 12.4 KB"`
pub fn describe(artifact: &Artifact) -> String {
    format!(
        "{}, {}",
        plural_count(count_pages(artifact.as_bytes()), "page"),
        format_size(artifact.len())
    )
}

/// File name of `path` for status lines.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

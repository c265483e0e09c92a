//! Pre-initialization checks on the target directory.

use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Entries that do not make a directory "used".
const IGNORED_ENTRIES: &[&str] = &[".git", ".DS_Store"];

/// Where `init` scaffolds the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    /// `vellum init` - the working directory, which must be unused
    CurrentDir,
    /// `vellum init <name>` - a new directory, which may exist only if unused
    NewDir,
}

/// Refuse to scaffold over an existing project.
pub fn validate_target(root: &Path, mode: InitMode) -> Result<()> {
    if is_unused(root)? {
        return Ok(());
    }
    match mode {
        InitMode::CurrentDir => bail!(
            "Current directory is not empty.\n\
             Use `vellum init <name>` to create the project in a new directory."
        ),
        InitMode::NewDir => bail!(
            "Directory '{}' is not empty.\n\
             Choose a different name or clear the directory first.",
            root.display()
        ),
    }
}

/// Missing, or holding only ignored entries.
fn is_unused(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if !path.is_dir() {
        bail!("'{}' exists and is not a directory", path.display());
    }
    for entry in fs::read_dir(path)
        .with_context(|| format!("Failed to read directory '{}'", path.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        if !IGNORED_ENTRIES.iter().any(|ignored| name == *ignored) {
            return Ok(false);
        }
    }
    Ok(true)
}

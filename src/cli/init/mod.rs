//! Project initialization.
//!
//! # Module Structure
//!
//! - [`validate`]: Pre-initialization checks
//! - [`structure`]: Directory structure creation
//! - [`config`]: Scaffold file generation

mod config;
mod structure;
mod validate;

use crate::config::PlaygroundConfig;
use crate::log;
use anyhow::Result;
use std::path::Path;

pub use validate::InitMode;

/// Create a new playground project at the configured root.
///
/// # Steps
/// 1. Validate target directory
/// 2. Create directory structure
/// 3. Write vellum.toml, main.lua and the pdf package
pub fn new_project(config: &PlaygroundConfig, has_name: bool) -> Result<()> {
    let root = &config.root;
    let mode = if has_name {
        InitMode::NewDir
    } else {
        InitMode::CurrentDir
    };
    validate::validate_target(root, mode)?;

    scaffold(root, &config_file_name(config))?;

    log!("init"; "project initialized at {}", root.display());
    log!("init"; "next: cd into it and run `vellum watch` or `vellum serve`");
    Ok(())
}

fn scaffold(root: &Path, config_name: &Path) -> Result<()> {
    structure::create_structure(root)?;
    let name = config::project_name(root);
    config::write_files(root, &name, config_name)
}

/// Config file name as given by `-C`.
fn config_file_name(config: &PlaygroundConfig) -> std::path::PathBuf {
    config
        .config_path
        .file_name()
        .map_or_else(|| "vellum.toml".into(), Into::into)
}

//! Scaffold file generation.
//!
//! Writes vellum.toml, the starter script and the pdf package.

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::embed::init::{CONFIG_TOML, MAIN_LUA, PDF_LUA, ProjectVars};

/// Files written relative to the project root, rendered for `name`.
fn scaffold_files(name: &str, config_name: &Path) -> Vec<(std::path::PathBuf, String)> {
    let vars = ProjectVars::new(name);
    vec![
        (config_name.to_path_buf(), CONFIG_TOML.render(&vars)),
        ("main.lua".into(), MAIN_LUA.render(&vars)),
        ("assets/packages/pdf.lua".into(), PDF_LUA.to_string()),
        (".gitignore".into(), "/output.pdf\n.DS_Store\n".to_string()),
    ]
}

/// Write all scaffold files. Existing files are left alone.
pub fn write_files(root: &Path, name: &str, config_name: &Path) -> Result<()> {
    for (relative, content) in scaffold_files(name, config_name) {
        let path = root.join(relative);
        if path.exists() {
            continue;
        }
        fs::write(&path, content)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
    }
    Ok(())
}

/// Project name used in templates: the root's directory name, restricted
/// to characters that are safe in a TOML string and a file name.
pub fn project_name(root: &Path) -> String {
    let raw = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let name = name.trim_matches('-');
    if name.is_empty() {
        "vellum".to_string()
    } else {
        name.to_string()
    }
}

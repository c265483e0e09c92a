//! Side-loaded resources staged into every sandbox.
//!
//! Layout of the resource index directory:
//!
//! ```text
//! assets/
//! ├── fonts/          # binary assets, staged at /fonts/<name>
//! └── packages/       # *.lua modules, loadable with require("<name>")
//!     └── pdf/page.lua    # -> require("pdf.page")
//! ```

use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use super::engine::Engine;
use super::error::InitError;
use crate::log;

/// Virtual directory fonts are staged under.
pub const FONT_DIR: &str = "/fonts";

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Resources read once at startup and re-staged for every fresh engine.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    /// (virtual path, bytes)
    pub fonts: Vec<(String, Vec<u8>)>,
    /// (module name, source)
    pub packages: Vec<(String, String)>,
}

impl Resources {
    /// Read the resource index.
    ///
    /// A missing or non-directory index fails, as does an unreadable
    /// package. Unreadable fonts are skipped with a log line.
    pub fn load(index: &Path) -> Result<Self, InitError> {
        if !index.exists() {
            return Err(InitError::read(index, "no such directory"));
        }
        if !index.is_dir() {
            return Err(InitError::NotADirectory(index.to_path_buf()));
        }

        let mut resources = Self::default();

        let font_root = index.join("fonts");
        for path in collect_files(&font_root) {
            let name = relative_name(&font_root, &path);
            match std::fs::read(&path) {
                Ok(bytes) => resources.fonts.push((format!("{FONT_DIR}/{name}"), bytes)),
                Err(e) => log!("runtime"; "skipping font {}: {}", path.display(), e),
            }
        }

        let package_root = index.join("packages");
        for path in collect_files(&package_root) {
            if path.extension().is_none_or(|ext| ext != "lua") {
                continue;
            }
            let source = std::fs::read_to_string(&path).map_err(|e| InitError::read(&path, e))?;
            resources.packages.push((module_name(&package_root, &path), source));
        }

        Ok(resources)
    }

    /// Stage fonts and install packages into `engine`.
    pub fn stage(&self, engine: &mut dyn Engine) -> Result<(), InitError> {
        engine
            .create_dir(FONT_DIR)
            .map_err(|e| InitError::Stage {
                path: FONT_DIR.into(),
                reason: e.to_string(),
            })?;

        for (path, bytes) in &self.fonts {
            if let Some((parent, _)) = path.rsplit_once('/')
                && !parent.is_empty()
            {
                engine.create_dir(parent).map_err(|e| InitError::Stage {
                    path: parent.into(),
                    reason: e.to_string(),
                })?;
            }
            engine
                .write_asset(path, bytes)
                .map_err(|e| InitError::Stage {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
        }

        for (name, source) in &self.packages {
            engine
                .install_package(name, source)
                .map_err(|e| InitError::Package {
                    name: name.clone(),
                    reason: e.message,
                })?;
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty() && self.packages.is_empty()
    }
}

/// Regular files under `dir`, sorted. Empty when `dir` does not exist.
fn collect_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .collect()
}

/// Slash-separated path of `path` relative to `root`.
fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `packages/pdf/page.lua` -> `pdf.page`; `packages/pdf/init.lua` -> `pdf`.
fn module_name(root: &Path, path: &Path) -> String {
    let rel = relative_name(root, path);
    let stem = rel.strip_suffix(".lua").unwrap_or(&rel);
    let stem = stem.strip_suffix("/init").unwrap_or(stem);
    stem.replace('/', ".")
}

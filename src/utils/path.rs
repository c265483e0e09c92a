//! Path normalization utilities.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Expand `~` and resolve relative paths against `root`.
pub fn resolve_from(root: &Path, path: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    if path.is_absolute() {
        normalize_path(&path)
    } else {
        normalize_path(&root.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_absolute_missing() {
        let path = Path::new("/definitely/not/here.lua");
        assert_eq!(normalize_path(path), path);
    }

    #[test]
    fn test_resolve_from_relative() {
        let root = Path::new("/nonexistent-root");
        assert_eq!(
            resolve_from(root, Path::new("main.lua")),
            PathBuf::from("/nonexistent-root/main.lua")
        );
    }

    #[test]
    fn test_resolve_from_absolute_wins() {
        let root = Path::new("/nonexistent-root");
        assert_eq!(
            resolve_from(root, Path::new("/elsewhere/main.lua")),
            PathBuf::from("/elsewhere/main.lua")
        );
    }
}

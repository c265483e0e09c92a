//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from the current directory.
///
/// ```text
/// /home/user/doc/scripts/   ← cwd
/// /home/user/doc/vellum.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Walk up from `start` looking for `config_name`.
pub fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_in_ancestor() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("vellum.toml"), "").unwrap();

        assert_eq!(
            find_config_file_from(&nested, Path::new("vellum.toml")),
            Some(dir.path().join("vellum.toml"))
        );
    }

    #[test]
    fn test_absolute_missing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("none.toml");
        assert_eq!(find_config_file_from(dir.path(), &missing), None);
    }
}

//! In-memory virtual filesystem backing the sandbox's `vfs` table.
//!
//! Paths are absolute and slash-separated. `.` and `..` segments are
//! resolved lexically; `..` never escapes `/`.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    #[error("path `{0}` is not absolute")]
    NotAbsolute(String),

    #[error("no such directory: `{0}`")]
    NoParent(String),

    #[error("`{0}` is a directory")]
    IsDirectory(String),

    #[error("`{0}` is a file")]
    IsFile(String),

    #[error("no such file or directory: `{0}`")]
    NotFound(String),

    #[error("directory `{0}` is not empty")]
    NotEmpty(String),
}

#[derive(Debug, Clone)]
pub struct Vfs {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

impl Default for Vfs {
    fn default() -> Self {
        Self {
            files: BTreeMap::new(),
            dirs: ["/", "/tmp"].into_iter().map(String::from).collect(),
        }
    }
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, path: &str) -> Result<&[u8], VfsError> {
        let path = normalize(path)?;
        if self.dirs.contains(&path) {
            return Err(VfsError::IsDirectory(path));
        }
        self.files
            .get(&path)
            .map(Vec::as_slice)
            .ok_or(VfsError::NotFound(path))
    }

    pub fn write(&mut self, path: &str, bytes: Vec<u8>) -> Result<(), VfsError> {
        let path = normalize(path)?;
        if self.dirs.contains(&path) {
            return Err(VfsError::IsDirectory(path));
        }
        let parent = parent_of(&path);
        if !self.dirs.contains(parent) {
            return Err(VfsError::NoParent(parent.to_string()));
        }
        self.files.insert(path, bytes);
        Ok(())
    }

    pub fn exists(&self, path: &str) -> bool {
        normalize(path).is_ok_and(|p| self.files.contains_key(&p) || self.dirs.contains(&p))
    }

    /// Create a directory and any missing ancestors. Existing directories are fine.
    pub fn mkdir(&mut self, path: &str) -> Result<(), VfsError> {
        let path = normalize(path)?;
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current.push('/');
            current.push_str(segment);
            if self.files.contains_key(&current) {
                return Err(VfsError::IsFile(current));
            }
            self.dirs.insert(current.clone());
        }
        Ok(())
    }

    /// Remove a file or an empty directory.
    pub fn remove(&mut self, path: &str) -> Result<(), VfsError> {
        let path = normalize(path)?;
        if self.files.remove(&path).is_some() {
            return Ok(());
        }
        if !self.dirs.contains(&path) {
            return Err(VfsError::NotFound(path));
        }
        if path == "/" || !self.children(&path).is_empty() {
            return Err(VfsError::NotEmpty(path));
        }
        self.dirs.remove(&path);
        Ok(())
    }

    /// Entry names directly under a directory, sorted.
    pub fn list(&self, path: &str) -> Result<Vec<String>, VfsError> {
        let path = normalize(path)?;
        if self.files.contains_key(&path) {
            return Err(VfsError::IsFile(path));
        }
        if !self.dirs.contains(&path) {
            return Err(VfsError::NotFound(path));
        }
        Ok(self.children(&path))
    }

    fn children(&self, dir: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .files
            .keys()
            .chain(self.dirs.iter())
            .filter(|p| p.as_str() != dir && parent_of(p) == dir)
            .filter_map(|p| p.rsplit('/').next().map(String::from))
            .collect();
        names.sort();
        names
    }
}

fn normalize(path: &str) -> Result<String, VfsError> {
    if !path.starts_with('/') {
        return Err(VfsError::NotAbsolute(path.to_string()));
    }
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    Ok(format!("/{}", parts.join("/")))
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

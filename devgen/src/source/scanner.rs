//! Finding the `.rs` files of one source root.
//!
//! `.gitignore` and `.ignore` files are honoured even when the root is not
//! inside a git checkout. The `filter` glob is matched against paths relative
//! to the root, and files come back sorted by path.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::{Walk, WalkBuilder};

use crate::error::SourceError;

/// One `.rs` file read from a source root.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// `path` without the root; the bare file name when the root is the file.
    pub relative_path: PathBuf,
    pub content: String,
}

#[derive(Debug)]
pub struct SourceScanner {
    root: PathBuf,
    filter: Option<glob::Pattern>,
}

impl SourceScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: None,
        }
    }

    /// Only keep files whose root-relative path matches the glob.
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, SourceError> {
        let pattern = glob::Pattern::new(pattern).map_err(|e| SourceError::InvalidFilter {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.filter = Some(pattern);
        Ok(self)
    }

    /// Read every kept file. A root that is itself a `.rs` file yields that
    /// file alone.
    pub fn scan(&self) -> Result<Vec<SourceFile>, SourceError> {
        if !self.root.exists() {
            return Err(SourceError::RootNotFound {
                path: self.root.clone(),
            });
        }

        let mut files = Vec::new();
        for entry in self.walk() {
            let entry = entry?;
            let path = entry.path();
            if !is_rust_file(path) {
                continue;
            }
            let relative_path = self.relative_path(path);
            if !self.keeps(&relative_path) {
                continue;
            }

            let content = fs::read_to_string(path).map_err(|e| SourceError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            files.push(SourceFile {
                path: path.to_path_buf(),
                relative_path,
                content,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn walk(&self) -> Walk {
        WalkBuilder::new(&self.root)
            .hidden(false)
            .require_git(false)
            .build()
    }

    fn keeps(&self, relative_path: &Path) -> bool {
        match &self.filter {
            Some(pattern) => pattern.matches_path(relative_path),
            None => true,
        }
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => {
                path.file_name().map(PathBuf::from).unwrap_or_default()
            }
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path.to_path_buf(),
        }
    }
}

fn is_rust_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "rs")
}

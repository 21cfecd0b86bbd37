//! Loading of the source roots generators run against.
//!
//! - [`scanner`] discovers `.rs` files under each root
//! - [`parser`] turns them into a [`model`] of types, docs and markers
//!
//! [`SourceTree::load`] combines both and keeps going past broken files:
//! every file that fails to read or parse is reported alongside the tree.

pub mod model;
pub mod parser;
pub mod scanner;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SourceError;
use crate::markers::Registry;

pub use model::{
    FieldDecl, MarkerSet, ParsedFile, TypeDecl, TypeKind, TypeRef, VariantDecl, VariantShape,
};
pub use parser::SourceParser;
pub use scanner::{SourceFile, SourceScanner};

/// Every parsed file under the configured roots.
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    files: Vec<ParsedFile>,
}

impl SourceTree {
    /// Scan and parse all roots.
    ///
    /// Returns the tree of the files that parsed plus the errors for those
    /// that did not.
    pub fn load(
        roots: &[PathBuf],
        filter: Option<&str>,
        markers: &Registry,
    ) -> (SourceTree, Vec<SourceError>) {
        let parser = SourceParser::new(markers);
        let mut files = Vec::new();
        let mut errors = Vec::new();

        for root in roots {
            let mut scanner = SourceScanner::new(root);
            if let Some(pattern) = filter {
                scanner = match scanner.with_filter(pattern) {
                    Ok(scanner) => scanner,
                    Err(e) => {
                        errors.push(e);
                        continue;
                    }
                };
            }

            let sources = match scanner.scan() {
                Ok(sources) => sources,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            debug!(root = %root.display(), files = sources.len(), "scanned source root");

            for source in &sources {
                match parser.parse_file(source) {
                    Ok(parsed) => files.push(parsed),
                    Err(e) => errors.push(e),
                }
            }
        }

        (SourceTree { files }, errors)
    }

    pub fn from_files(files: Vec<ParsedFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[ParsedFile] {
        &self.files
    }

    /// All types in file order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.files.iter().flat_map(|f| f.types.iter())
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.types().find(|t| t.name == name)
    }

    /// Files grouped by the directory they live in.
    pub fn packages(&self) -> BTreeMap<&Path, Vec<&ParsedFile>> {
        let mut packages: BTreeMap<&Path, Vec<&ParsedFile>> = BTreeMap::new();
        for file in &self.files {
            packages
                .entry(file.package_dir.as_path())
                .or_default()
                .push(file);
        }
        packages
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError::{RootNotFound, Syntax};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_collects_errors_and_keeps_good_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("v1")).unwrap();
        fs::write(dir.path().join("v1/good.rs"), "pub struct Good;").unwrap();
        fs::write(dir.path().join("v1/bad.rs"), "pub struct {").unwrap();
        fs::create_dir(dir.path().join("v2")).unwrap();
        fs::write(dir.path().join("v2/other.rs"), "pub enum E { A }").unwrap();

        let roots = vec![dir.path().to_path_buf(), dir.path().join("missing")];
        let (tree, errors) = SourceTree::load(&roots, None, &Registry::new());

        assert_eq!(tree.files().len(), 2);
        assert!(tree.find_type("Good").is_some());
        assert!(tree.find_type("E").is_some());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(e, Syntax { .. })));
        assert!(errors.iter().any(|e| matches!(e, RootNotFound { .. })));

        let packages = tree.packages();
        assert_eq!(packages.len(), 2);
    }

    #[test]
    fn test_load_applies_filter() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("keep.rs"), "pub struct Keep;").unwrap();
        fs::write(dir.path().join("drop.rs"), "pub struct Drop;").unwrap();

        let (tree, errors) =
            SourceTree::load(&[dir.path().to_path_buf()], Some("keep*"), &Registry::new());
        assert!(errors.is_empty());
        assert_eq!(tree.types().count(), 1);
        assert!(tree.find_type("Keep").is_some());
    }
}

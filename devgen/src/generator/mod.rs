//! Generator capability and the built-in generator set.
//!
//! A [`Generator`] turns the parsed source roots into named artifacts. It
//! declares the shape of its command line options, optional help, and the
//! source markers it reads from doc comments. The set of generators is
//! fixed at build time: [`GeneratorRegistry::builtin`] lists every one of
//! them under the name used on the command line.
//!
//! ## Built-in generators
//!
//! | Name         | Produces                                           |
//! |--------------|----------------------------------------------------|
//! | `overrides`  | plugin/parent override structs                     |
//! | `interfaces` | union member accessors for `+union` enums          |
//! | `crds`       | CustomResourceDefinition manifests                 |
//! | `deepcopy`   | `deep_copy` methods                                |
//! | `schemas`    | JSON Schema documents                              |
//! | `validate`   | `validate` methods from field constraints          |
//! | `getters`    | defaulted boolean getters                          |

mod crds;
mod deepcopy;
mod getters;
mod interfaces;
mod overrides;
mod schema;
mod schemas;
mod validate;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{GenerateError, RegistryError};
use crate::markers::{
    MarkerDefinition, MarkerHelp, MarkerSchema, MarkerScope, MarkerValue, Registry,
};
use crate::source::{ParsedFile, SourceTree};

pub use crds::CrdGenerator;
pub use deepcopy::DeepCopyGenerator;
pub use getters::GettersGenerator;
pub use interfaces::InterfacesGenerator;
pub use overrides::OverridesGenerator;
pub use schemas::SchemasGenerator;
pub use validate::ValidateGenerator;

/// First line of every generated Rust file.
pub const GENERATED_HEADER: &str = "// Code generated by devgen. DO NOT EDIT.";

/// What an artifact is, which decides where the `artifacts` output rule
/// puts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Source code that belongs next to the types it was generated from.
    Code,
    /// Manifests and schemas that belong in a configuration directory.
    Config,
}

/// A named byte payload produced by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the destination chosen by the output rule.
    pub name: PathBuf,
    pub kind: ArtifactKind,
    /// Package directory the artifact was generated for (code artifacts).
    pub package: Option<PathBuf>,
    pub contents: Vec<u8>,
}

impl Artifact {
    pub fn code(
        package: impl Into<PathBuf>,
        name: impl Into<PathBuf>,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ArtifactKind::Code,
            package: Some(package.into()),
            contents: contents.into(),
        }
    }

    pub fn config(name: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            kind: ArtifactKind::Config,
            package: None,
            contents: contents.into(),
        }
    }
}

/// Everything a generator may look at while running.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    /// The resolved source roots, in command line order.
    pub roots: &'a [PathBuf],
    /// Parsed contents of the roots.
    pub sources: &'a SourceTree,
}

/// A pluggable unit that produces artifacts from the source roots.
///
/// Generators are stateless from the runtime's point of view: the same
/// instance may be invoked once per run with different options.
pub trait Generator: Send + Sync {
    /// Shape of the options given on the command line (`name:key=value`).
    fn options_schema(&self) -> MarkerSchema {
        MarkerSchema::empty()
    }

    /// Help shown for the generator's option marker.
    fn help(&self) -> Option<MarkerHelp> {
        None
    }

    /// Register the markers this generator reads from doc comments.
    fn register_markers(&self, _registry: &mut Registry) -> Result<(), RegistryError> {
        Ok(())
    }

    /// Produce artifacts for the given sources.
    fn generate(
        &self,
        ctx: &GenerationContext<'_>,
        options: &MarkerValue,
    ) -> Result<Vec<Artifact>, GenerateError>;
}

/// Fixed mapping from generator name to implementation, in registration
/// order.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    entries: Vec<(String, Arc<dyn Generator>)>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a generator under a name.
    ///
    /// Names are not checked here; a clash surfaces when the options
    /// registry is built.
    pub fn with(mut self, name: impl Into<String>, generator: impl Generator + 'static) -> Self {
        self.entries.push((name.into(), Arc::new(generator)));
        self
    }

    /// Every generator shipped with devgen.
    pub fn builtin() -> Self {
        Self::new()
            .with("overrides", OverridesGenerator)
            .with("interfaces", InterfacesGenerator)
            .with("crds", CrdGenerator)
            .with("deepcopy", DeepCopyGenerator)
            .with("schemas", SchemasGenerator)
            .with("validate", ValidateGenerator)
            .with("getters", GettersGenerator)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Generator>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Generator>)> {
        self.entries.iter().map(|(n, g)| (n.as_str(), g))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Source markers shared by several generators, registered once.
pub fn register_common_markers(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_with_help(
        MarkerDefinition::new("optional", MarkerScope::Field, MarkerSchema::flag())?,
        Some(MarkerHelp::new(
            "common",
            "marks a field as optional even if its type is not an Option",
        )),
    )
}

/// Decode generator options, mapping failures to [`GenerateError::Options`].
pub(crate) fn decode_options<T: DeserializeOwned>(
    options: &MarkerValue,
) -> Result<T, GenerateError> {
    options
        .decode()
        .map_err(|e| GenerateError::Options(e.to_string()))
}

/// Name of the code artifact generated for one source file,
/// e.g. `zz_generated_types_deepcopy.rs` for `types.rs`.
pub(crate) fn code_file_name(file: &ParsedFile, suffix: &str) -> PathBuf {
    let stem = file
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "generated".to_string());
    PathBuf::from(format!("zz_generated_{}_{}.rs", stem, suffix))
}

/// Wrap generated impl blocks into a complete code artifact.
pub(crate) fn code_artifact(file: &ParsedFile, suffix: &str, header: &str, body: &str) -> Artifact {
    let mut contents = String::new();
    if !header.is_empty() {
        contents.push_str(header.trim_end());
        contents.push_str("\n\n");
    }
    contents.push_str(GENERATED_HEADER);
    contents.push_str("\n\n");
    contents.push_str(body.trim_end());
    contents.push('\n');
    let name = code_file_name(file, suffix);
    Artifact::code(file.package_dir.clone(), name, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_builtin_names_in_order() {
        let names: Vec<_> = GeneratorRegistry::builtin()
            .names()
            .map(str::to_string)
            .collect();
        assert_eq!(
            names,
            vec![
                "overrides",
                "interfaces",
                "crds",
                "deepcopy",
                "schemas",
                "validate",
                "getters"
            ]
        );
    }

    #[test]
    fn test_builtin_source_markers_do_not_collide() {
        let mut reg = Registry::new();
        register_common_markers(&mut reg).unwrap();
        for (_, generator) in GeneratorRegistry::builtin().iter() {
            generator.register_markers(&mut reg).unwrap();
        }
        assert!(reg.contains("optional"));
        assert!(reg.contains("kubebuilder:object:root"));
    }

    #[test]
    fn test_code_file_name() {
        let file = ParsedFile {
            path: PathBuf::from("api/v1/types.rs"),
            relative_path: PathBuf::from("v1/types.rs"),
            package_dir: PathBuf::from("api/v1"),
            markers: Default::default(),
            types: vec![],
        };
        assert_eq!(
            code_file_name(&file, "deepcopy"),
            PathBuf::from("zz_generated_types_deepcopy.rs")
        );
        let artifact = code_artifact(&file, "deepcopy", "", "impl A {}\n\n");
        assert_eq!(artifact.package.as_deref(), Some(Path::new("api/v1")));
        assert_eq!(
            String::from_utf8(artifact.contents).unwrap(),
            format!("{}\n\nimpl A {{}}\n", GENERATED_HEADER)
        );
    }
}

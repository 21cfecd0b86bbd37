//! `deepcopy`: field-by-field `deep_copy` methods.

use std::fs;

use serde::Deserialize;

use super::{code_artifact, decode_options, Artifact, GenerationContext, Generator};
use crate::error::{GenerateError, RegistryError};
use crate::markers::{
    ArgKind, FieldSpec, MarkerDefinition, MarkerHelp, MarkerSchema, MarkerScope, MarkerValue,
    Registry,
};
use crate::source::{FieldDecl, ParsedFile, TypeDecl, TypeKind, VariantShape};

const PACKAGE_MARKER: &str = "devgen:deepcopy:package";
const TYPE_MARKER: &str = "devgen:deepcopy:generate";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DeepCopyOptions {
    header_file: Option<String>,
    year: Option<String>,
}

/// Generates `deep_copy` and `deep_copy_into` for marked types.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepCopyGenerator;

impl Generator for DeepCopyGenerator {
    fn options_schema(&self) -> MarkerSchema {
        MarkerSchema::fields(vec![
            FieldSpec::optional("headerFile", ArgKind::String)
                .with_help("file whose contents are prepended to every generated file"),
            FieldSpec::optional("year", ArgKind::String)
                .with_help("value substituted for YEAR in the header file")
                .advanced(),
        ])
    }

    fn help(&self) -> Option<MarkerHelp> {
        Some(
            MarkerHelp::new("generators", "generates deep copy methods").with_details(
                "Types marked +devgen:deepcopy:generate, or every type of a file carrying \
                 //! +devgen:deepcopy:package, get deep_copy and deep_copy_into methods.",
            ),
        )
    }

    fn register_markers(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        registry.register_with_help(
            MarkerDefinition::new(PACKAGE_MARKER, MarkerScope::Package, MarkerSchema::flag())?,
            Some(MarkerHelp::new(
                "deepcopy",
                "enables deep copy generation for every type in the file",
            )),
        )?;
        registry.register_with_help(
            MarkerDefinition::new(TYPE_MARKER, MarkerScope::Type, MarkerSchema::flag())?,
            Some(MarkerHelp::new(
                "deepcopy",
                "enables or disables deep copy generation for this type",
            )),
        )
    }

    fn generate(
        &self,
        ctx: &GenerationContext<'_>,
        options: &MarkerValue,
    ) -> Result<Vec<Artifact>, GenerateError> {
        let options: DeepCopyOptions = decode_options(options)?;
        let header = match &options.header_file {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|e| {
                    GenerateError::Options(format!("unable to read header file {}: {}", path, e))
                })?;
                match &options.year {
                    Some(year) => raw.replace(" YEAR", &format!(" {}", year)),
                    None => raw,
                }
            }
            None => String::new(),
        };

        let mut artifacts = Vec::new();
        for file in ctx.sources.files() {
            let body: Vec<String> = selected_types(file).map(render_impl).collect();
            if body.is_empty() {
                continue;
            }
            artifacts.push(code_artifact(file, "deepcopy", &header, &body.join("\n")));
        }
        Ok(artifacts)
    }
}

fn selected_types(file: &ParsedFile) -> impl Iterator<Item = &TypeDecl> {
    let package_wide = file.markers.is_set(PACKAGE_MARKER);
    file.types
        .iter()
        .filter(move |t| match t.markers.get(TYPE_MARKER) {
            Some(value) => value.as_bool().unwrap_or(true),
            None => package_wide,
        })
}

fn render_impl(decl: &TypeDecl) -> String {
    let body = match &decl.kind {
        TypeKind::Struct { fields } if fields.is_empty() => "Self {}".to_string(),
        TypeKind::Struct { fields } if fields.iter().all(FieldDecl::is_named) => {
            let inits: Vec<String> = fields
                .iter()
                .map(|f| format!("            {0}: self.{0}.clone(),", f.name))
                .collect();
            format!("Self {{\n{}\n        }}", inits.join("\n"))
        }
        TypeKind::Struct { fields } => {
            let inits: Vec<String> = fields
                .iter()
                .map(|f| format!("self.{}.clone()", f.name))
                .collect();
            format!("Self({})", inits.join(", "))
        }
        TypeKind::Enum { variants } if variants.is_empty() => "match *self {}".to_string(),
        TypeKind::Enum { variants } => {
            let arms: Vec<String> = variants
                .iter()
                .map(|v| {
                    let arm = match &v.shape {
                        VariantShape::Unit => format!("Self::{0} => Self::{0},", v.name),
                        VariantShape::Tuple(types) => {
                            let binds: Vec<String> =
                                (0..types.len()).map(|i| format!("f{}", i)).collect();
                            let clones: Vec<String> =
                                binds.iter().map(|b| format!("{}.clone()", b)).collect();
                            format!(
                                "Self::{name}({}) => Self::{name}({}),",
                                binds.join(", "), clones.join(", "), name = v.name
                            )
                        }
                        VariantShape::Struct(fields) => {
                            let binds: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
                            let clones: Vec<String> =
                                binds.iter().map(|b| format!("{b}: {b}.clone()")).collect();
                            format!(
                                "Self::{name} {{ {} }} => Self::{name} {{ {} }},",
                                binds.join(", "), clones.join(", "), name = v.name
                            )
                        }
                    };
                    format!("            {}", arm)
                })
                .collect();
            format!("match self {{\n{}\n        }}", arms.join("\n"))
        }
    };

    format!(
        "impl {name} {{\n    \
         /// Copies the receiver into `out`.\n    \
         pub fn deep_copy_into(&self, out: &mut Self) {{\n        \
         *out = self.deep_copy();\n    \
         }}\n\n    \
         /// Returns a deep copy of the receiver.\n    \
         pub fn deep_copy(&self) -> Self {{\n        \
         {body}\n    \
         }}\n\
         }}\n",
        name = decl.name, body = body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceParser, SourceTree};
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn sources(code: &str) -> SourceTree {
        let mut reg = Registry::new();
        DeepCopyGenerator.register_markers(&mut reg).unwrap();
        let path = PathBuf::from("api/types.rs");
        let file = SourceParser::new(&reg)
            .parse_source(code, &path, &PathBuf::from("types.rs"))
            .unwrap();
        SourceTree::from_files(vec![file])
    }

    fn run(tree: &SourceTree, options: serde_json::Value) -> Result<Vec<Artifact>, GenerateError> {
        let ctx = GenerationContext {
            roots: &[],
            sources: tree,
        };
        DeepCopyGenerator.generate(&ctx, &MarkerValue::new(options))
    }

    #[test]
    fn test_marked_types_only() {
        let tree = sources(
            r#"
            /// +devgen:deepcopy:generate
            pub struct Workspace { pub name: String, pub tags: Vec<String> }
            pub struct Skipped { pub a: u8 }
            /// +devgen:deepcopy:generate
            pub enum Source { Git { remote: String }, Zip(String, u8), Empty }
            "#,
        );
        let artifacts = run(&tree, json!({})).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(
            artifacts[0].name,
            PathBuf::from("zz_generated_types_deepcopy.rs")
        );

        let code = String::from_utf8(artifacts[0].contents.clone()).unwrap();
        assert!(code.contains("impl Workspace {"));
        assert!(code.contains("name: self.name.clone(),"));
        assert!(!code.contains("impl Skipped"));
        assert!(code.contains("Self::Git { remote } => Self::Git { remote: remote.clone() },"));
        assert!(code.contains("Self::Zip(f0, f1) => Self::Zip(f0.clone(), f1.clone()),"));
        assert!(code.contains("Self::Empty => Self::Empty,"));
    }

    #[test]
    fn test_package_marker_with_type_opt_out() {
        let tree = sources(
            r#"
            //! +devgen:deepcopy:package
            pub struct A(pub String);
            /// +devgen:deepcopy:generate=false
            pub struct B;
            "#,
        );
        let artifacts = run(&tree, json!({})).unwrap();
        let code = String::from_utf8(artifacts[0].contents.clone()).unwrap();
        assert!(code.contains("Self(self.0.clone())"));
        assert!(!code.contains("impl B"));
    }

    #[test]
    fn test_no_marked_types_yields_nothing() {
        let tree = sources("pub struct A;");
        assert!(run(&tree, json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_header_file_and_year() {
        let header = NamedTempFile::new().unwrap();
        std::fs::write(header.path(), "// Copyright YEAR Example\n").unwrap();
        let tree = sources("/// +devgen:deepcopy:generate\npub struct A;");

        let artifacts = run(
            &tree,
            json!({"headerFile": header.path().to_string_lossy(), "year": "2024"}),
        )
        .unwrap();
        let code = String::from_utf8(artifacts[0].contents.clone()).unwrap();
        assert!(code.starts_with("// Copyright 2024 Example\n\n// Code generated by devgen."));
    }

    #[test]
    fn test_missing_header_file_is_an_options_error() {
        let tree = sources("/// +devgen:deepcopy:generate\npub struct A;");
        let err = run(&tree, json!({"headerFile": "/definitely/not/here"})).unwrap_err();
        assert!(matches!(err, GenerateError::Options(_)));
    }
}

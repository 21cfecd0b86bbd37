//! `getters`: accessors for optional booleans with a declared default.

use super::{code_artifact, Artifact, GenerationContext, Generator};
use crate::error::{GenerateError, RegistryError};
use crate::markers::{
    ArgKind, MarkerDefinition, MarkerHelp, MarkerSchema, MarkerScope, MarkerValue, Registry,
};
use crate::source::{TypeDecl, TypeRef};

const DEFAULT_MARKER: &str = "devgen:getter:default";

#[derive(Debug, Clone, Copy, Default)]
pub struct GettersGenerator;

impl Generator for GettersGenerator {
    fn help(&self) -> Option<MarkerHelp> {
        Some(
            MarkerHelp::new("generators", "generates getters for optional booleans").with_details(
                "Every Option<bool> field marked +devgen:getter:default=<bool> gets a \
                 get_<field>() method returning the field value or the default.",
            ),
        )
    }

    fn register_markers(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        let definition = MarkerDefinition::new(
            DEFAULT_MARKER,
            MarkerScope::Field,
            MarkerSchema::value(ArgKind::Bool),
        )?;
        let help = MarkerHelp::new("getters", "default returned when the field is unset");
        registry.register_with_help(definition, Some(help))
    }

    fn generate(
        &self,
        ctx: &GenerationContext<'_>,
        _options: &MarkerValue,
    ) -> Result<Vec<Artifact>, GenerateError> {
        let mut artifacts = Vec::new();
        for file in ctx.sources.files() {
            let mut body = Vec::new();
            for decl in &file.types {
                if let Some(block) = render_getters(decl)? {
                    body.push(block);
                }
            }
            if !body.is_empty() {
                artifacts.push(code_artifact(file, "getters", "", &body.join("\n")));
            }
        }
        Ok(artifacts)
    }
}

fn render_getters(decl: &TypeDecl) -> Result<Option<String>, GenerateError> {
    let mut methods = Vec::new();
    for field in decl.fields() {
        let Some(value) = field.markers.get(DEFAULT_MARKER) else {
            continue;
        };
        if field.ty != TypeRef::Option(Box::new(TypeRef::Bool)) {
            let message = format!(
                "{} is only supported on Option<bool> fields, not '{}'",
                DEFAULT_MARKER, field.name
            );
            return Err(GenerateError::source(&decl.name, message));
        }
        let default = value.as_bool().unwrap_or_default();
        methods.push(format!(
            "    /// Returns `{field}`, or `{default}` if it is not set.\n    \
             pub fn get_{field}(&self) -> bool {{\n        \
             self.{field}.unwrap_or({default})\n    \
             }}\n",
            field = field.name, default = default
        ));
    }

    if methods.is_empty() {
        return Ok(None);
    }
    let methods = methods.join("\n");
    Ok(Some(format!("impl {} {{\n{}}}\n", decl.name, methods)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceParser, SourceTree};
    use std::path::PathBuf;

    fn run(code: &str) -> Result<Vec<Artifact>, GenerateError> {
        let mut reg = Registry::new();
        GettersGenerator.register_markers(&mut reg).unwrap();
        let path = PathBuf::from("types.rs");
        let file = SourceParser::new(&reg)
            .parse_source(code, &path, &path)
            .unwrap();
        let tree = SourceTree::from_files(vec![file]);
        let ctx = GenerationContext {
            roots: &[],
            sources: &tree,
        };
        GettersGenerator.generate(&ctx, &MarkerValue::new(serde_json::json!({})))
    }

    #[test]
    fn test_generates_defaulted_getter() {
        let artifacts = run(
            r#"
            pub struct Volume {
                /// +devgen:getter:default=false
                pub ephemeral: Option<bool>,
                pub size: Option<String>,
            }
            "#,
        )
        .unwrap();
        assert_eq!(artifacts.len(), 1);
        let code = String::from_utf8(artifacts[0].contents.clone()).unwrap();
        assert!(code.contains("impl Volume {"));
        assert!(code.contains("pub fn get_ephemeral(&self) -> bool {"));
        assert!(code.contains("self.ephemeral.unwrap_or(false)"));
        assert!(!code.contains("get_size"));
    }

    #[test]
    fn test_rejects_non_optional_bool() {
        let err = run(
            r#"
            pub struct Volume {
                /// +devgen:getter:default=true
                pub ephemeral: bool,
            }
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Volume:"));
    }

    #[test]
    fn test_no_markers_no_artifacts() {
        let artifacts = run("pub struct A { pub b: Option<bool> }").unwrap();
        assert!(artifacts.is_empty());
    }
}

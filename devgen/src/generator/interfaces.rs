//! `interfaces`: discriminator accessors for union enums.
//!
//! A union is an enum where exactly one member is set at a time. For every
//! enum marked `+union` this generates the list of member names and a
//! `union_member()` method naming the member held by a value, so that
//! callers can dispatch on members without matching on every variant.

use convert_case::{Case, Casing};

use super::{code_artifact, Artifact, GenerationContext, Generator};
use crate::error::{GenerateError, RegistryError};
use crate::markers::{
    MarkerDefinition, MarkerHelp, MarkerSchema, MarkerScope, MarkerValue, Registry,
};
use crate::source::{TypeDecl, TypeKind, VariantShape};

const UNION_MARKER: &str = "union";

#[derive(Debug, Clone, Copy, Default)]
pub struct InterfacesGenerator;

impl Generator for InterfacesGenerator {
    fn help(&self) -> Option<MarkerHelp> {
        Some(MarkerHelp::new(
            "generators",
            "generates union member accessors for enums marked +union",
        ))
    }

    fn register_markers(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        registry.register_with_help(
            MarkerDefinition::new(UNION_MARKER, MarkerScope::Type, MarkerSchema::flag())?,
            Some(MarkerHelp::new(
                "interfaces",
                "marks an enum as a union of mutually exclusive members",
            )),
        )
    }

    fn generate(
        &self,
        ctx: &GenerationContext<'_>,
        _options: &MarkerValue,
    ) -> Result<Vec<Artifact>, GenerateError> {
        let mut artifacts = Vec::new();
        for file in ctx.sources.files() {
            let mut body = Vec::new();
            for decl in file.types.iter().filter(|t| t.markers.is_set(UNION_MARKER)) {
                body.push(render_union(decl)?);
            }
            if !body.is_empty() {
                artifacts.push(code_artifact(file, "union", "", &body.join("\n")));
            }
        }
        Ok(artifacts)
    }
}

fn render_union(decl: &TypeDecl) -> Result<String, GenerateError> {
    let TypeKind::Enum { variants } = &decl.kind else {
        return Err(GenerateError::source(
            &decl.name,
            "+union is only supported on enums",
        ));
    };
    if variants.is_empty() {
        return Err(GenerateError::source(
            &decl.name,
            "a union needs at least one member",
        ));
    }

    let members: Vec<String> = variants
        .iter()
        .map(|v| v.name.to_case(Case::Camel))
        .collect();
    let arms = variants
        .iter()
        .zip(&members)
        .map(|(v, member)| {
            let pattern = match v.shape {
                VariantShape::Unit => format!("Self::{}", v.name),
                VariantShape::Tuple(_) => format!("Self::{}(..)", v.name),
                VariantShape::Struct(_) => format!("Self::{} {{ .. }}", v.name),
            };
            format!("            {} => \"{}\",", pattern, member)
        })
        .collect::<Vec<_>>()
        .join("\n");
    let quoted: Vec<String> = members.iter().map(|m| format!("\"{}\"", m)).collect();
    let members = quoted.join(", ");

    Ok(format!(
        "impl {name} {{\n    \
         /// Names of the members of this union.\n    \
         pub const UNION_MEMBERS: &'static [&'static str] = &[{members}];\n\n    \
         /// Name of the member held by this value.\n    \
         pub fn union_member(&self) -> &'static str {{\n        \
         match self {{\n\
         {arms}\n        \
         }}\n    \
         }}\n\
         }}\n",
        name = decl.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceParser, SourceTree};
    use std::path::PathBuf;

    fn run(code: &str) -> Result<Vec<Artifact>, GenerateError> {
        let mut reg = Registry::new();
        InterfacesGenerator.register_markers(&mut reg).unwrap();
        let path = PathBuf::from("types.rs");
        let file = SourceParser::new(&reg)
            .parse_source(code, &path, &path)
            .unwrap();
        let tree = SourceTree::from_files(vec![file]);
        let ctx = GenerationContext {
            roots: &[],
            sources: &tree,
        };
        InterfacesGenerator.generate(&ctx, &MarkerValue::new(serde_json::json!({})))
    }

    #[test]
    fn test_union_accessors() {
        let artifacts = run(
            r#"
            /// +union
            pub enum ComponentUnion {
                Container(Container),
                Kubernetes { uri: String },
                Custom,
            }
            pub enum NotAUnion { A, B }
            "#,
        )
        .unwrap();
        assert_eq!(
            artifacts[0].name,
            PathBuf::from("zz_generated_types_union.rs")
        );
        let code = String::from_utf8(artifacts[0].contents.clone()).unwrap();
        assert!(code.contains("pub const UNION_MEMBERS: &'static [&'static str] = &["));
        assert!(code.contains(r#"&["container", "kubernetes", "custom"];"#));
        assert!(code.contains("Self::Container(..) => \"container\","));
        assert!(code.contains("Self::Kubernetes { .. } => \"kubernetes\","));
        assert!(code.contains("Self::Custom => \"custom\","));
        assert!(!code.contains("NotAUnion"));
    }

    #[test]
    fn test_union_on_struct_is_an_error() {
        let err = run("/// +union\npub struct S { pub a: String }").unwrap_err();
        assert!(matches!(err, GenerateError::Source { .. }));
    }
}

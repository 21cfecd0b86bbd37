//! Rust source parser.
//!
//! Parses files with `syn`, keeps top-level structs and enums, and splits
//! their doc comments into plain documentation and `+marker` lines. Marker
//! lines are resolved against a [`Registry`] of source markers; lines that
//! name no known marker are ignored.

use std::path::Path;

use syn::{Attribute, Fields, FieldsUnnamed, Item};

use crate::error::SourceError;
use crate::markers::{MarkerScope, Registry};
use crate::source::model::{
    FieldDecl, MarkerSet, ParsedFile, TypeDecl, TypeKind, TypeRef, VariantDecl, VariantShape,
};
use crate::source::scanner::SourceFile;

/// Parser bound to the source marker vocabulary of the selected generators.
#[derive(Debug)]
pub struct SourceParser<'a> {
    markers: &'a Registry,
}

impl<'a> SourceParser<'a> {
    pub fn new(markers: &'a Registry) -> Self {
        Self { markers }
    }

    pub fn parse_file(&self, source: &SourceFile) -> Result<ParsedFile, SourceError> {
        self.parse_source(&source.content, &source.path, &source.relative_path)
    }

    pub fn parse_source(
        &self,
        content: &str,
        path: &Path,
        relative_path: &Path,
    ) -> Result<ParsedFile, SourceError> {
        let syntax = syn::parse_file(content).map_err(|e| SourceError::Syntax {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (_, markers) = self.split_docs(&syntax.attrs, MarkerScope::Package, path)?;

        let mut types = Vec::new();
        for item in &syntax.items {
            match item {
                Item::Struct(item) => {
                    let (docs, markers) = self.split_docs(&item.attrs, MarkerScope::Type, path)?;
                    types.push(TypeDecl {
                        name: item.ident.to_string(),
                        file: path.to_path_buf(),
                        docs,
                        markers,
                        kind: TypeKind::Struct {
                            fields: self.fields(&item.fields, path)?,
                        },
                    });
                }
                Item::Enum(item) => {
                    let (docs, markers) = self.split_docs(&item.attrs, MarkerScope::Type, path)?;
                    let mut variants = Vec::new();
                    for variant in &item.variants {
                        let (variant_docs, _) =
                            self.split_docs(&variant.attrs, MarkerScope::Field, path)?;
                        let shape = match &variant.fields {
                            Fields::Unit => VariantShape::Unit,
                            Fields::Unnamed(unnamed) => VariantShape::Tuple(tuple_types(unnamed)),
                            Fields::Named(_) => {
                                VariantShape::Struct(self.fields(&variant.fields, path)?)
                            }
                        };
                        variants.push(VariantDecl {
                            name: variant.ident.to_string(),
                            docs: variant_docs,
                            shape,
                        });
                    }
                    types.push(TypeDecl {
                        name: item.ident.to_string(),
                        file: path.to_path_buf(),
                        docs,
                        markers,
                        kind: TypeKind::Enum { variants },
                    });
                }
                _ => {}
            }
        }

        Ok(ParsedFile {
            path: path.to_path_buf(),
            relative_path: relative_path.to_path_buf(),
            package_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            markers,
            types,
        })
    }

    fn fields(&self, fields: &Fields, path: &Path) -> Result<Vec<FieldDecl>, SourceError> {
        let mut out = Vec::new();
        for (i, field) in fields.iter().enumerate() {
            let (docs, markers) = self.split_docs(&field.attrs, MarkerScope::Field, path)?;
            out.push(FieldDecl {
                name: field
                    .ident
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| i.to_string()),
                ty: TypeRef::from_syn(&field.ty),
                docs,
                markers,
            });
        }
        Ok(out)
    }

    /// Split doc attributes into documentation lines and parsed markers.
    fn split_docs(
        &self,
        attrs: &[Attribute],
        scope: MarkerScope,
        path: &Path,
    ) -> Result<(Vec<String>, MarkerSet), SourceError> {
        let mut docs = Vec::new();
        let mut markers = MarkerSet::default();

        for line in attrs.iter().filter_map(doc_text).flat_map(|text| {
            text.lines()
                .map(|l| l.trim().to_string())
                .collect::<Vec<_>>()
        }) {
            if !line.starts_with('+') {
                if !line.is_empty() {
                    docs.push(line);
                }
                continue;
            }

            let token = &line[1..];
            let Some(definition) = self.markers.lookup(token, scope) else {
                continue;
            };
            let value = definition
                .parse(token)
                .map_err(|message| SourceError::Marker {
                    path: path.to_path_buf(),
                    message: format!("+{}: {}", token, message),
                })?;
            markers.insert(definition.name(), value);
        }

        Ok((docs, markers))
    }
}

fn tuple_types(fields: &FieldsUnnamed) -> Vec<TypeRef> {
    fields
        .unnamed
        .iter()
        .map(|f| TypeRef::from_syn(&f.ty))
        .collect()
}

fn doc_text(attr: &Attribute) -> Option<String> {
    if !attr.path().is_ident("doc") {
        return None;
    }
    match &attr.meta {
        syn::Meta::NameValue(nv) => match &nv.value {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(s),
                ..
            }) => Some(s.value()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{ArgKind, FieldSpec, MarkerDefinition, MarkerSchema};
    use std::path::PathBuf;

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register(
            MarkerDefinition::new(
                "kubebuilder:object:root",
                MarkerScope::Type,
                MarkerSchema::flag(),
            )
            .unwrap(),
        )
        .unwrap();
        reg.register(
            MarkerDefinition::new(
                "kubebuilder:resource",
                MarkerScope::Type,
                MarkerSchema::fields(vec![FieldSpec::optional("path", ArgKind::String)]),
            )
            .unwrap(),
        )
        .unwrap();
        reg.register(
            MarkerDefinition::new("optional", MarkerScope::Field, MarkerSchema::flag()).unwrap(),
        )
        .unwrap();
        reg.register(
            MarkerDefinition::new(
                "groupName",
                MarkerScope::Package,
                MarkerSchema::value(ArgKind::String),
            )
            .unwrap(),
        )
        .unwrap();
        reg
    }

    fn parse(code: &str) -> Result<ParsedFile, SourceError> {
        let reg = registry();
        let path = PathBuf::from("api/types.rs");
        SourceParser::new(&reg).parse_source(code, &path, &PathBuf::from("types.rs"))
    }

    #[test]
    fn test_extracts_types_docs_and_markers() {
        let file = parse(
            r#"
            //! +groupName=workspace.devfile.io

            /// DevWorkspace is the Schema for the devworkspaces API
            /// +kubebuilder:object:root=true
            /// +kubebuilder:resource:path=devworkspaces
            /// +some:other:tool
            pub struct DevWorkspace {
                /// Whether the workspace is started
                /// +optional
                pub started: Option<bool>,
                pub name: String,
            }

            pub enum Phase { Running, Failed(String), Stopped { reason: String } }

            fn ignored() {}
            "#,
        )
        .unwrap();

        assert_eq!(file.package_dir, PathBuf::from("api"));
        assert_eq!(
            file.markers.get("groupName").unwrap().as_str(),
            Some("workspace.devfile.io")
        );
        assert_eq!(file.types.len(), 2);

        let ws = &file.types[0];
        assert_eq!(ws.name, "DevWorkspace");
        assert_eq!(
            ws.docs,
            vec!["DevWorkspace is the Schema for the devworkspaces API"]
        );
        assert!(ws.markers.is_set("kubebuilder:object:root"));
        let resource = ws.markers.get("kubebuilder:resource").unwrap();
        assert_eq!(
            resource.field("path"),
            Some(&serde_json::json!("devworkspaces"))
        );
        assert_eq!(ws.markers.names().count(), 2);

        let started = &ws.fields()[0];
        assert!(started.markers.is_set("optional"));
        assert_eq!(started.docs, vec!["Whether the workspace is started"]);
        assert_eq!(started.ty, TypeRef::Option(Box::new(TypeRef::Bool)));

        match &file.types[1].kind {
            TypeKind::Enum { variants } => {
                assert_eq!(variants.len(), 3);
                assert!(matches!(variants[0].shape, VariantShape::Unit));
                assert!(matches!(variants[1].shape, VariantShape::Tuple(_)));
                assert!(matches!(variants[2].shape, VariantShape::Struct(_)));
            }
            TypeKind::Struct { .. } => panic!("expected enum"),
        }
    }

    #[test]
    fn test_marker_scope_is_respected() {
        let file = parse(
            r#"
            /// +optional
            pub struct A { x: u32 }
            "#,
        )
        .unwrap();
        assert!(file.types[0].markers.is_empty());
    }

    #[test]
    fn test_malformed_known_marker_is_an_error() {
        let err = parse(
            r#"
            /// +kubebuilder:object:root=perhaps
            pub struct A;
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Marker { .. }));
        assert!(err.to_string().contains("kubebuilder:object:root=perhaps"));
    }

    #[test]
    fn test_syntax_error() {
        let err = parse("pub struct {").unwrap_err();
        assert!(matches!(err, SourceError::Syntax { .. }));
    }

    #[test]
    fn test_tuple_fields_are_indexed() {
        let file = parse("pub struct Pair(String, u8);").unwrap();
        let fields = file.types[0].fields();
        assert_eq!(fields[0].name, "0");
        assert!(!fields[1].is_named());
    }
}

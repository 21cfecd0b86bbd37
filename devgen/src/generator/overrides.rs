//! `overrides`: partial copies of API types used to override a parent or
//! plugin definition.
//!
//! For every type marked `+devgen:overrides:generate` an `<Type>ParentOverride`
//! (or `<Type>PluginOverride` with `isForPluginOverrides`) is generated in
//! which every field is optional, fields marked `+devgen:overrides:omit` are
//! dropped, and references to other overridden types point at their
//! override counterparts.

use std::collections::BTreeSet;

use serde::Deserialize;

use super::{code_artifact, decode_options, Artifact, GenerationContext, Generator};
use crate::error::{GenerateError, RegistryError};
use crate::markers::{
    ArgKind, FieldSpec, MarkerDefinition, MarkerHelp, MarkerSchema, MarkerScope, MarkerValue,
    Registry,
};
use crate::source::{FieldDecl, TypeDecl, TypeKind, TypeRef, VariantShape};

const GENERATE_MARKER: &str = "devgen:overrides:generate";
const OMIT_MARKER: &str = "devgen:overrides:omit";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OverridesOptions {
    is_for_plugin_overrides: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OverridesGenerator;

impl Generator for OverridesGenerator {
    fn options_schema(&self) -> MarkerSchema {
        let plugin = FieldSpec::optional("isForPluginOverrides", ArgKind::Bool)
            .with_help("generate PluginOverride types instead of ParentOverride types");
        MarkerSchema::fields(vec![plugin])
    }

    fn help(&self) -> Option<MarkerHelp> {
        Some(
            MarkerHelp::new("generators", "generates override types").with_details(
                "Types marked +devgen:overrides:generate get a copy where every field is \
                 optional. Fields marked +devgen:overrides:omit are left out.",
            ),
        )
    }

    fn register_markers(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        registry.register_with_help(
            MarkerDefinition::new(GENERATE_MARKER, MarkerScope::Type, MarkerSchema::flag())?,
            Some(MarkerHelp::new(
                "overrides",
                "generates an override type for this type",
            )),
        )?;
        registry.register_with_help(
            MarkerDefinition::new(OMIT_MARKER, MarkerScope::Field, MarkerSchema::flag())?,
            Some(MarkerHelp::new(
                "overrides",
                "leaves this field out of the override type",
            )),
        )
    }

    fn generate(
        &self,
        ctx: &GenerationContext<'_>,
        options: &MarkerValue,
    ) -> Result<Vec<Artifact>, GenerateError> {
        let options: OverridesOptions = decode_options(options)?;
        let (suffix, file_suffix) = if options.is_for_plugin_overrides {
            ("PluginOverride", "plugin_overrides")
        } else {
            ("ParentOverride", "parent_overrides")
        };

        let overridden: BTreeSet<&str> = ctx
            .sources
            .types()
            .filter(|t| t.markers.is_set(GENERATE_MARKER))
            .map(|t| t.name.as_str())
            .collect();
        let renderer = Renderer {
            overridden: &overridden,
            suffix,
        };

        let mut artifacts = Vec::new();
        for file in ctx.sources.files() {
            let mut body = Vec::new();
            for decl in &file.types {
                if overridden.contains(decl.name.as_str()) {
                    body.push(renderer.render_type(decl)?);
                }
            }
            if !body.is_empty() {
                artifacts.push(code_artifact(file, file_suffix, "", &body.join("\n")));
            }
        }
        Ok(artifacts)
    }
}

struct Renderer<'a> {
    overridden: &'a BTreeSet<&'a str>,
    suffix: &'a str,
}

impl Renderer<'_> {
    fn render_type(&self, decl: &TypeDecl) -> Result<String, GenerateError> {
        let name = format!("{}{}", decl.name, self.suffix);
        let doc = format!(
            "/// {} of [`{}`] where every field is optional.\n",
            self.suffix, decl.name
        );
        let derive = "#[derive(Debug, Clone, Default, PartialEq)]\n";

        match &decl.kind {
            TypeKind::Struct { fields } if fields.iter().all(FieldDecl::is_named) => {
                let fields = self.render_fields(decl, fields, "    ", "pub ")?;
                Ok(format!("{doc}{derive}pub struct {name} {{\n{fields}}}\n"))
            }
            TypeKind::Struct { fields } => {
                let types = fields
                    .iter()
                    .map(|f| self.field_type(decl, &f.ty).map(|t| format!("pub {}", t)))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(", ");
                Ok(format!("{doc}{derive}pub struct {name}({types});\n"))
            }
            TypeKind::Enum { variants } => {
                let mut out = String::new();
                for variant in variants {
                    let line = match &variant.shape {
                        VariantShape::Unit => format!("    {},\n", variant.name),
                        VariantShape::Tuple(types) => {
                            let types = types
                                .iter()
                                .map(|t| self.rename(decl, t))
                                .collect::<Result<Vec<_>, _>>()?;
                            format!("    {}({}),\n", variant.name, types.join(", "))
                        }
                        VariantShape::Struct(fields) => {
                            let fields = self.render_fields(decl, fields, "        ", "")?;
                            format!("    {} {{\n{}    }},\n", variant.name, fields)
                        }
                    };
                    out.push_str(&line);
                }
                // No `Default` for enums.
                Ok(format!(
                    "{doc}#[derive(Debug, Clone, PartialEq)]\npub enum {name} {{\n{out}}}\n"
                ))
            }
        }
    }

    fn render_fields(
        &self,
        decl: &TypeDecl,
        fields: &[FieldDecl],
        indent: &str,
        visibility: &str,
    ) -> Result<String, GenerateError> {
        let mut out = String::new();
        for field in fields.iter().filter(|f| !f.markers.is_set(OMIT_MARKER)) {
            for doc in &field.docs {
                out.push_str(&format!("{indent}/// {doc}\n"));
            }
            out.push_str(&format!(
                "{indent}{visibility}{}: {},\n",
                field.name, self.field_type(decl, &field.ty)?
            ));
        }
        Ok(out)
    }

    /// Field type in the override: always an `Option`.
    fn field_type(&self, decl: &TypeDecl, ty: &TypeRef) -> Result<String, GenerateError> {
        let renamed = self.rename(decl, ty)?;
        Ok(if ty.is_option() {
            renamed
        } else {
            format!("Option<{}>", renamed)
        })
    }

    fn rename(&self, decl: &TypeDecl, ty: &TypeRef) -> Result<String, GenerateError> {
        self.rewrite(ty).render().ok_or_else(|| {
            GenerateError::source(&decl.name, "field type cannot be expressed in an override")
        })
    }

    fn rewrite(&self, ty: &TypeRef) -> TypeRef {
        match ty {
            TypeRef::Option(inner) => TypeRef::Option(Box::new(self.rewrite(inner))),
            TypeRef::List(inner) => TypeRef::List(Box::new(self.rewrite(inner))),
            TypeRef::Map { kind, value } => TypeRef::Map {
                kind: kind.clone(),
                value: Box::new(self.rewrite(value)),
            },
            TypeRef::Named { name, args } => TypeRef::Named {
                name: if self.overridden.contains(name.as_str()) {
                    format!("{}{}", name, self.suffix)
                } else {
                    name.clone()
                },
                args: args.iter().map(|a| self.rewrite(a)).collect(),
            },
            other => other.clone(),
        }
    }
}

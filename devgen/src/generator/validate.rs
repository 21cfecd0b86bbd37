//! `validate`: `validate()` methods built from field constraint markers.

use super::{code_artifact, Artifact, GenerationContext, Generator};
use crate::error::{GenerateError, RegistryError};
use crate::markers::{
    ArgKind, MarkerDefinition, MarkerHelp, MarkerSchema, MarkerScope, MarkerValue, Registry,
};
use crate::source::{FieldDecl, TypeDecl, TypeRef};

const NON_EMPTY_MARKER: &str = "devgen:validate:nonEmpty";
const MAX_LENGTH_MARKER: &str = "devgen:validate:maxLength";

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateGenerator;

impl Generator for ValidateGenerator {
    fn help(&self) -> Option<MarkerHelp> {
        Some(
            MarkerHelp::new("generators", "generates validation methods").with_details(
                "Structs with fields marked +devgen:validate:nonEmpty or \
                 +devgen:validate:maxLength=<int> get a validate() method returning the \
                 first violated constraint.",
            ),
        )
    }

    fn register_markers(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        registry.register_with_help(
            MarkerDefinition::new(NON_EMPTY_MARKER, MarkerScope::Field, MarkerSchema::flag())?,
            Some(MarkerHelp::new(
                "validate",
                "the string, list or map must not be empty",
            )),
        )?;
        registry.register_with_help(
            MarkerDefinition::new(
                MAX_LENGTH_MARKER,
                MarkerScope::Field,
                MarkerSchema::value(ArgKind::Int),
            )?,
            Some(MarkerHelp::new(
                "validate",
                "maximum length of a string field",
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
            for decl in &file.types {
                if let Some(block) = render_validate(decl)? {
                    body.push(block);
                }
            }
            if !body.is_empty() {
                artifacts.push(code_artifact(file, "validate", "", &body.join("\n")));
            }
        }
        Ok(artifacts)
    }
}

fn render_validate(decl: &TypeDecl) -> Result<Option<String>, GenerateError> {
    let mut checks = Vec::new();
    for field in decl.fields() {
        let mut conditions = Vec::new();
        if field.markers.is_set(NON_EMPTY_MARKER) {
            check_kind(decl, field, NON_EMPTY_MARKER, true)?;
            conditions.push((
                "value.is_empty()".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let max_length = field.markers.get(MAX_LENGTH_MARKER);
        if let Some(max) = max_length.and_then(|v| v.as_json().as_i64()) {
            check_kind(decl, field, MAX_LENGTH_MARKER, false)?;
            conditions.push((
                format!("value.chars().count() > {}", max),
                format!("must be at most {} characters", max),
            ));
        }
        if conditions.is_empty() {
            continue;
        }

        let mut block = String::new();
        for (condition, message) in conditions {
            block.push_str(&format!(
                "            if {} {{\n                \
                 return Err(\"{}: {}\".to_string());\n            \
                 }}\n",
                condition, field.name, message
            ));
        }
        let binding = if field.ty.is_option() {
            format!("        if let Some(value) = &self.{} {{\n", field.name)
        } else {
            format!(
                "        {{\n            let value = &self.{};\n",
                field.name
            )
        };
        checks.push(format!("{}{}        }}\n", binding, block));
    }

    if checks.is_empty() {
        return Ok(None);
    }
    let checks = checks.concat();
    Ok(Some(format!(
        "impl {name} {{\n    \
         /// Checks the field constraints declared on [`{name}`].\n    \
         pub fn validate(&self) -> Result<(), String> {{\n\
         {checks}        \
         Ok(())\n    \
         }}\n\
         }}\n",
        name = decl.name
    )))
}

/// `nonEmpty` accepts strings, lists and maps; `maxLength` only strings.
fn check_kind(
    decl: &TypeDecl,
    field: &FieldDecl,
    marker: &str,
    collections: bool,
) -> Result<(), GenerateError> {
    let ty = match &field.ty {
        TypeRef::Option(inner) => inner.as_ref(),
        other => other,
    };
    let supported = match ty {
        TypeRef::String => true,
        TypeRef::List(_) | TypeRef::Map { .. } => collections,
        _ => false,
    };
    if supported {
        Ok(())
    } else {
        let message = format!("+{} is not supported on field '{}'", marker, field.name);
        Err(GenerateError::source(&decl.name, message))
    }
}

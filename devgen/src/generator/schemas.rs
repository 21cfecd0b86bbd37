//! `schemas`: standalone JSON Schema documents.

use convert_case::{Case, Casing};
use serde_json::{json, Value};

use super::schema::{SchemaBuilder, SchemaFlavor};
use super::{Artifact, GenerationContext, Generator};
use crate::error::{GenerateError, RegistryError};
use crate::markers::{
    MarkerDefinition, MarkerHelp, MarkerSchema, MarkerScope, MarkerValue, Registry,
};

const GENERATE_MARKER: &str = "devgen:jsonschema:generate";
const DRAFT: &str = "http://json-schema.org/draft-07/schema#";

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemasGenerator;

impl Generator for SchemasGenerator {
    fn help(&self) -> Option<MarkerHelp> {
        Some(
            MarkerHelp::new("generators", "generates JSON Schema documents").with_details(
                "One draft-07 document per type marked +devgen:jsonschema:generate, named after \
                 the type in snake case. Referenced types are emitted under definitions.",
            ),
        )
    }

    fn register_markers(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        registry.register_with_help(
            MarkerDefinition::new(GENERATE_MARKER, MarkerScope::Type, MarkerSchema::flag())?,
            Some(MarkerHelp::new(
                "schemas",
                "generates a JSON Schema document for this type",
            )),
        )
    }

    fn generate(
        &self,
        ctx: &GenerationContext<'_>,
        _options: &MarkerValue,
    ) -> Result<Vec<Artifact>, GenerateError> {
        let mut artifacts = Vec::new();
        for decl in ctx.sources.types() {
            if !decl.markers.is_set(GENERATE_MARKER) {
                continue;
            }
            let mut builder = SchemaBuilder::new(ctx.sources, SchemaFlavor::Definitions);
            let mut document = builder.type_schema(decl);
            let definitions = builder.into_definitions();

            if let Value::Object(obj) = &mut document {
                obj.insert("$schema".to_string(), json!(DRAFT));
                obj.insert("title".to_string(), json!(decl.name));
                if !definitions.is_empty() {
                    obj.insert("definitions".to_string(), json!(definitions));
                }
            }

            let name = format!("{}.json", decl.name.to_case(Case::Snake));
            let mut contents = serde_json::to_string_pretty(&document)
                .map_err(|e| GenerateError::render(&name, e.to_string()))?;
            contents.push('\n');
            artifacts.push(Artifact::config(name, contents));
        }
        Ok(artifacts)
    }
}

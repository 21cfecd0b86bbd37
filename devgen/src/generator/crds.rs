//! `crds`: CustomResourceDefinition manifests for root API types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{SchemaBuilder, SchemaFlavor};
use super::{decode_options, Artifact, GenerationContext, Generator};
use crate::error::{GenerateError, RegistryError};
use crate::markers::{
    ArgKind, FieldSpec, MarkerDefinition, MarkerHelp, MarkerSchema, MarkerScope, MarkerValue,
    Registry,
};
use crate::source::TypeDecl;

const ROOT_MARKER: &str = "kubebuilder:object:root";
const RESOURCE_MARKER: &str = "kubebuilder:resource";

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CrdOptions {
    group: String,
    version: String,
}

impl Default for CrdOptions {
    fn default() -> Self {
        Self {
            group: "workspace.devfile.io".to_string(),
            version: "v1alpha2".to_string(),
        }
    }
}

/// Arguments of `+kubebuilder:resource`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ResourceMarker {
    path: Option<String>,
    scope: Option<String>,
    short_name: Vec<String>,
    singular: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomResourceDefinition {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    spec: CrdSpec,
}

#[derive(Debug, Serialize)]
struct Metadata {
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CrdSpec {
    group: String,
    names: CrdNames,
    scope: String,
    versions: Vec<CrdVersion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CrdNames {
    kind: String,
    list_kind: String,
    plural: String,
    singular: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    short_names: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CrdVersion {
    name: String,
    served: bool,
    storage: bool,
    schema: CrdValidation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CrdValidation {
    #[serde(rename = "openAPIV3Schema")]
    open_api_v3_schema: Value,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CrdGenerator;

impl Generator for CrdGenerator {
    fn options_schema(&self) -> MarkerSchema {
        MarkerSchema::fields(vec![
            FieldSpec::optional("group", ArgKind::String)
                .with_help("API group of the generated resources (default workspace.devfile.io)"),
            FieldSpec::optional("version", ArgKind::String)
                .with_help("API version served by the generated resources (default v1alpha2)"),
        ])
    }

    fn help(&self) -> Option<MarkerHelp> {
        Some(
            MarkerHelp::new("generators", "generates CustomResourceDefinition manifests")
                .with_details(
                    "One YAML manifest per type marked +kubebuilder:object:root, named \
                     <group>_<plural>.yaml. The OpenAPI schema inlines every referenced type.",
                ),
        )
    }

    fn register_markers(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        registry.register_with_help(
            MarkerDefinition::new(ROOT_MARKER, MarkerScope::Type, MarkerSchema::flag())?,
            Some(MarkerHelp::new(
                "crds",
                "marks a type as the root object of a resource",
            )),
        )?;
        registry.register_with_help(
            MarkerDefinition::new(
                RESOURCE_MARKER,
                MarkerScope::Type,
                MarkerSchema::fields(vec![
                    FieldSpec::optional("path", ArgKind::String).with_help("plural resource name"),
                    FieldSpec::optional("scope", ArgKind::String)
                        .with_help("Namespaced or Cluster"),
                    FieldSpec::optional("shortName", ArgKind::StringList)
                        .with_help("short names for kubectl")
                        .advanced(),
                    FieldSpec::optional("singular", ArgKind::String)
                        .with_help("singular resource name")
                        .advanced(),
                ]),
            )?,
            Some(MarkerHelp::new(
                "crds",
                "configures the resource names and scope",
            )),
        )
    }

    fn generate(
        &self,
        ctx: &GenerationContext<'_>,
        options: &MarkerValue,
    ) -> Result<Vec<Artifact>, GenerateError> {
        let options: CrdOptions = decode_options(options)?;

        let mut artifacts = Vec::new();
        for decl in ctx.sources.types() {
            if !decl.markers.is_set(ROOT_MARKER) {
                continue;
            }
            let crd = build_crd(ctx, decl, &options)?;
            let name = format!("{}_{}.yaml", options.group, crd.spec.names.plural);
            let yaml = serde_yaml::to_string(&crd)
                .map_err(|e| GenerateError::render(&name, e.to_string()))?;
            artifacts.push(Artifact::config(name, yaml));
        }
        Ok(artifacts)
    }
}

fn build_crd(
    ctx: &GenerationContext<'_>,
    decl: &TypeDecl,
    options: &CrdOptions,
) -> Result<CustomResourceDefinition, GenerateError> {
    if !decl.is_struct() {
        return Err(GenerateError::source(
            &decl.name,
            "a resource root must be a struct",
        ));
    }
    let resource: ResourceMarker = match decl.markers.get(RESOURCE_MARKER) {
        Some(value) => value
            .decode()
            .map_err(|e| GenerateError::source(&decl.name, e.to_string()))?,
        None => ResourceMarker::default(),
    };

    let scope = resource.scope.unwrap_or_else(|| "Namespaced".to_string());
    if scope != "Namespaced" && scope != "Cluster" {
        return Err(GenerateError::source(
            &decl.name,
            format!(
                "resource scope must be Namespaced or Cluster, not '{}'",
                scope
            ),
        ));
    }
    let lower = decl.name.to_lowercase();
    let plural = resource.path.unwrap_or_else(|| format!("{}s", lower));
    let singular = resource.singular.unwrap_or(lower);

    let schema = SchemaBuilder::new(ctx.sources, SchemaFlavor::Inline).type_schema(decl);

    Ok(CustomResourceDefinition {
        api_version: "apiextensions.k8s.io/v1",
        kind: "CustomResourceDefinition",
        metadata: Metadata {
            name: format!("{}.{}", plural, options.group),
        },
        spec: CrdSpec {
            group: options.group.clone(),
            names: CrdNames {
                kind: decl.name.clone(),
                list_kind: format!("{}List", decl.name),
                plural,
                singular,
                short_names: resource.short_name,
            },
            scope,
            versions: vec![CrdVersion {
                name: options.version.clone(),
                served: true,
                storage: true,
                schema: CrdValidation {
                    open_api_v3_schema: schema,
                },
            }],
        },
    })
}

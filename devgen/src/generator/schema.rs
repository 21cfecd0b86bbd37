//! OpenAPI / JSON Schema construction from the source model.
//!
//! Shared by the `crds` generator (everything inlined, the way Kubernetes
//! wants it) and the `schemas` generator (named types become
//! `#/definitions/...` references).

use std::collections::BTreeMap;

use convert_case::{Case, Casing};
use serde_json::{json, Map, Value};

use crate::source::{
    FieldDecl, SourceTree, TypeDecl, TypeKind, TypeRef, VariantDecl, VariantShape,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchemaFlavor {
    /// Inline every referenced type; recursion is cut off with
    /// `x-kubernetes-preserve-unknown-fields`.
    Inline,
    /// Reference named types through `definitions`.
    Definitions,
}

pub(crate) struct SchemaBuilder<'a> {
    sources: &'a SourceTree,
    flavor: SchemaFlavor,
    definitions: BTreeMap<String, Value>,
    visiting: Vec<String>,
}

impl<'a> SchemaBuilder<'a> {
    pub(crate) fn new(sources: &'a SourceTree, flavor: SchemaFlavor) -> Self {
        Self {
            sources,
            flavor,
            definitions: BTreeMap::new(),
            visiting: Vec::new(),
        }
    }

    /// Schema of the declaration itself (never a reference).
    pub(crate) fn type_schema(&mut self, decl: &TypeDecl) -> Value {
        self.visiting.push(decl.name.clone());
        let mut schema = match &decl.kind {
            TypeKind::Struct { fields } => self.fields_schema(fields),
            TypeKind::Enum { variants } => {
                if variants.iter().all(VariantDecl::is_unit) {
                    json!({
                        "type": "string",
                        "enum": variants.iter().map(|v| v.name.clone()).collect::<Vec<_>>(),
                    })
                } else {
                    let mut properties = Map::new();
                    for variant in variants {
                        let variant_schema = match &variant.shape {
                            VariantShape::Unit => json!({"type": "object"}),
                            VariantShape::Tuple(types) if types.len() == 1 => {
                                self.type_ref_schema(&types[0])
                            }
                            VariantShape::Tuple(_) => json!({"type": "array"}),
                            VariantShape::Struct(fields) => self.fields_schema(fields),
                        };
                        properties.insert(variant.name.to_case(Case::Camel), variant_schema);
                    }
                    json!({
                        "type": "object",
                        "properties": properties,
                        "maxProperties": 1,
                    })
                }
            }
        };
        self.visiting.pop();

        if let (Some(description), Value::Object(obj)) = (decl.description(), &mut schema) {
            obj.insert("description".to_string(), Value::String(description));
        }
        schema
    }

    /// Definitions collected so far (only used by [`SchemaFlavor::Definitions`]).
    pub(crate) fn into_definitions(self) -> BTreeMap<String, Value> {
        self.definitions
    }

    fn fields_schema(&mut self, fields: &[FieldDecl]) -> Value {
        if let [only] = fields {
            if !only.is_named() {
                return self.type_ref_schema(&only.ty);
            }
        }
        if fields.iter().any(|f| !f.is_named()) {
            return json!({"type": "array"});
        }

        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in fields {
            let name = field.name.to_case(Case::Camel);
            let mut schema = self.type_ref_schema(&field.ty);
            if !field.docs.is_empty() {
                if let Value::Object(obj) = &mut schema {
                    let description = field.docs.join(" ");
                    obj.insert("description".to_string(), Value::String(description));
                }
            }
            if !field.ty.is_option() && !field.markers.is_set("optional") {
                required.push(Value::String(name.clone()));
            }
            properties.insert(name, schema);
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }

    fn type_ref_schema(&mut self, ty: &TypeRef) -> Value {
        match ty {
            TypeRef::Bool => json!({"type": "boolean"}),
            TypeRef::String => json!({"type": "string"}),
            TypeRef::Int(name) => {
                let format = match name.as_str() {
                    "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => "int32",
                    _ => "int64",
                };
                json!({"type": "integer", "format": format})
            }
            TypeRef::Float(name) => {
                let format = if name == "f32" { "float" } else { "double" };
                json!({"type": "number", "format": format})
            }
            TypeRef::Option(inner) => self.type_ref_schema(inner),
            TypeRef::List(inner) => json!({
                "type": "array",
                "items": self.type_ref_schema(inner),
            }),
            TypeRef::Map { value, .. } => json!({
                "type": "object",
                "additionalProperties": self.type_ref_schema(value),
            }),
            TypeRef::Named { name, .. } => self.named_schema(name),
            TypeRef::Other => self.unknown_schema(),
        }
    }

    fn named_schema(&mut self, name: &str) -> Value {
        let Some(decl) = self.sources.find_type(name) else {
            return self.unknown_schema();
        };

        match self.flavor {
            SchemaFlavor::Inline => {
                if self.visiting.iter().any(|v| v == name) {
                    return json!({
                        "type": "object",
                        "x-kubernetes-preserve-unknown-fields": true,
                    });
                }
                self.type_schema(decl)
            }
            SchemaFlavor::Definitions => {
                if !self.definitions.contains_key(name) && !self.visiting.iter().any(|v| v == name)
                {
                    let schema = self.type_schema(decl);
                    self.definitions.insert(name.to_string(), schema);
                }
                json!({"$ref": format!("#/definitions/{}", name)})
            }
        }
    }

    fn unknown_schema(&self) -> Value {
        match self.flavor {
            SchemaFlavor::Inline => json!({"x-kubernetes-preserve-unknown-fields": true}),
            SchemaFlavor::Definitions => json!({}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::Registry;
    use crate::source::SourceParser;
    use std::path::PathBuf;

    fn tree(code: &str) -> SourceTree {
        let mut reg = Registry::new();
        crate::generator::register_common_markers(&mut reg).unwrap();
        let path = PathBuf::from("types.rs");
        let file = SourceParser::new(&reg)
            .parse_source(code, &path, &path)
            .unwrap();
        SourceTree::from_files(vec![file])
    }

    const API: &str = r#"
        /// A workspace
        pub struct Workspace {
            /// Display name
            pub display_name: String,
            pub replicas: Option<u32>,
            /// +optional
            pub labels: BTreeMap<String, String>,
            pub components: Vec<Component>,
            pub phase: Phase,
        }
        pub struct Component { pub name: String, pub children: Vec<Component> }
        pub enum Phase { Running, Stopped }
    "#;

    #[test]
    fn test_inline_schema() {
        let sources = tree(API);
        let decl = sources.find_type("Workspace").unwrap();
        let schema = SchemaBuilder::new(&sources, SchemaFlavor::Inline).type_schema(decl);

        assert_eq!(schema["description"], "A workspace");
        assert_eq!(
            schema["required"],
            json!(["displayName", "components", "phase"])
        );
        assert_eq!(
            schema["properties"]["displayName"]["description"],
            "Display name"
        );
        assert_eq!(
            schema["properties"]["replicas"],
            json!({"type": "integer", "format": "int32"})
        );
        assert_eq!(
            schema["properties"]["phase"],
            json!({"type": "string", "enum": ["Running", "Stopped"]})
        );
        let component = &schema["properties"]["components"]["items"];
        assert_eq!(component["properties"]["name"], json!({"type": "string"}));
        assert_eq!(
            component["properties"]["children"]["items"]["x-kubernetes-preserve-unknown-fields"],
            json!(true)
        );
    }

    #[test]
    fn test_definitions_schema() {
        let sources = tree(API);
        let decl = sources.find_type("Workspace").unwrap();
        let mut builder = SchemaBuilder::new(&sources, SchemaFlavor::Definitions);
        let schema = builder.type_schema(decl);
        let definitions = builder.into_definitions();

        assert_eq!(
            schema["properties"]["components"]["items"],
            json!({"$ref": "#/definitions/Component"})
        );
        assert!(definitions.contains_key("Component"));
        assert!(definitions.contains_key("Phase"));
        assert_eq!(
            definitions["Component"]["properties"]["children"]["items"],
            json!({"$ref": "#/definitions/Component"})
        );
    }

    #[test]
    fn test_union_enum_schema() {
        let sources = tree(
            r#"
            pub enum Source { Git { remote: String }, Zip(String), Empty }
            "#,
        );
        let decl = sources.find_type("Source").unwrap();
        let schema = SchemaBuilder::new(&sources, SchemaFlavor::Definitions).type_schema(decl);
        assert_eq!(schema["maxProperties"], 1);
        assert_eq!(schema["properties"]["zip"], json!({"type": "string"}));
        assert_eq!(schema["properties"]["git"]["required"], json!(["remote"]));
        assert_eq!(schema["properties"]["empty"], json!({"type": "object"}));
    }
}

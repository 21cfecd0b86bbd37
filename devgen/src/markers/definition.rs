//! Marker definitions: a name, the scope it describes and the shape of its
//! arguments.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RegistryError;
use crate::markers::value::{split_args, unquote, MarkerValue};

/// What a marker describes.
///
/// Command line options are always package markers; generators read type
/// and field markers out of doc comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerScope {
    /// Describes a whole package (a CLI option or an inner `//!` doc line).
    Package,
    /// Describes a struct or enum.
    Type,
    /// Describes a single struct field.
    Field,
}

impl MarkerScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerScope::Package => "package",
            MarkerScope::Type => "type",
            MarkerScope::Field => "field",
        }
    }
}

/// Kind of a single argument value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    Bool,
    Int,
    String,
    #[serde(rename = "[]string")]
    StringList,
}

impl ArgKind {
    /// Human readable type name used in help output.
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgKind::Bool => "bool",
            ArgKind::Int => "int",
            ArgKind::String => "string",
            ArgKind::StringList => "[]string",
        }
    }

    /// Parse a raw argument into a JSON value of this kind.
    pub fn parse(&self, raw: &str) -> Result<Value, String> {
        let raw = raw.trim();
        match self {
            ArgKind::Bool => match raw {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                other => Err(format!("expected true or false, got '{}'", other)),
            },
            ArgKind::Int => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| format!("expected an integer, got '{}'", raw)),
            ArgKind::String => Ok(Value::String(unquote(raw).to_string())),
            ArgKind::StringList => {
                let items: Vec<Value> = if let Some(inner) =
                    raw.strip_prefix('{').and_then(|r| r.strip_suffix('}'))
                {
                    split_args(inner)
                        .into_iter()
                        .map(|item| unquote(item.trim()).to_string())
                        .filter(|item| !item.is_empty())
                        .map(Value::String)
                        .collect()
                } else {
                    raw.split(';')
                        .map(|item| unquote(item.trim()).to_string())
                        .filter(|item| !item.is_empty())
                        .map(Value::String)
                        .collect()
                };
                Ok(Value::Array(items))
            }
        }
    }
}

/// A named argument of a field-style marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArgKind,
    pub optional: bool,
    /// Hidden from `summary` and `detailed` help, shown at `full`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub advanced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, kind: ArgKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
            advanced: false,
            help: None,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ArgKind) -> Self {
        Self {
            optional: true,
            ..Self::required(name, kind)
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }
}

/// The shape of the values a marker populates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum MarkerSchema {
    /// A single anonymous value: `name=value`, or bare `name` for bools.
    Value { kind: ArgKind },
    /// Named arguments: `name:key=value,other=value`.
    Fields { fields: Vec<FieldSpec> },
}

impl MarkerSchema {
    /// An anonymous boolean, set to true by the bare marker name.
    pub fn flag() -> Self {
        MarkerSchema::Value {
            kind: ArgKind::Bool,
        }
    }

    pub fn value(kind: ArgKind) -> Self {
        MarkerSchema::Value { kind }
    }

    pub fn fields(fields: Vec<FieldSpec>) -> Self {
        MarkerSchema::Fields { fields }
    }

    /// A marker that takes no arguments at all.
    pub fn empty() -> Self {
        MarkerSchema::Fields { fields: Vec::new() }
    }

    /// Compact usage string, e.g. `=<string>` or `:config=<string>,[code=<string>]`.
    /// Advanced fields are left out unless `include_advanced` is set.
    pub fn usage(&self, include_advanced: bool) -> String {
        match self {
            MarkerSchema::Value { kind: ArgKind::Bool } => "[=<bool>]".to_string(),
            MarkerSchema::Value { kind } => format!("=<{}>", kind.type_name()),
            MarkerSchema::Fields { fields } if fields.is_empty() => String::new(),
            MarkerSchema::Fields { fields } => {
                let parts: Vec<String> = fields
                    .iter()
                    .filter(|f| include_advanced || !f.advanced)
                    .map(|f| {
                        let arg = format!("{}=<{}>", f.name, f.kind.type_name());
                        if f.optional {
                            format!("[{}]", arg)
                        } else {
                            arg
                        }
                    })
                    .collect();
                format!(":{}", parts.join(","))
            }
        }
    }
}

/// A named, typed marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerDefinition {
    name: String,
    scope: MarkerScope,
    schema: MarkerSchema,
}

impl MarkerDefinition {
    /// Create a definition, validating the name.
    ///
    /// Names are `:`-separated paths of non-empty segments and may not
    /// contain whitespace, `=` or `,`.
    pub fn new(
        name: impl Into<String>,
        scope: MarkerScope,
        schema: MarkerSchema,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        let invalid = |reason: &str| RegistryError::InvalidName {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == ',' || c == '+')
        {
            return Err(invalid("name contains a reserved character"));
        }
        if name.split(':').any(str::is_empty) {
            return Err(invalid("name has an empty path segment"));
        }

        Ok(Self {
            name,
            scope,
            schema,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> MarkerScope {
        self.scope
    }

    pub fn schema(&self) -> &MarkerSchema {
        &self.schema
    }

    /// Whether `token` names this marker, i.e. is the name itself or the name
    /// followed by `:` or `=`.
    pub fn matches(&self, token: &str) -> bool {
        match token.strip_prefix(self.name.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with(':') || rest.starts_with('='),
            None => false,
        }
    }

    /// Parse a full token (`name`, `name=value` or `name:args`) into a value.
    ///
    /// The error is a bare message; callers attach the offending token.
    pub fn parse(&self, token: &str) -> Result<MarkerValue, String> {
        let rest = token
            .strip_prefix(self.name.as_str())
            .ok_or_else(|| format!("token does not name marker '{}'", self.name))?;

        match (&self.schema, rest.chars().next()) {
            (MarkerSchema::Value { kind: ArgKind::Bool }, None) => {
                Ok(MarkerValue::new(Value::Bool(true)))
            }
            (MarkerSchema::Value { kind }, None) => {
                Err(format!("expected a value: {}", self.value_usage(*kind)))
            }
            (MarkerSchema::Value { kind }, Some('=')) => {
                kind.parse(&rest[1..]).map(MarkerValue::new)
            }
            (MarkerSchema::Value { kind }, Some(':')) => {
                let usage = self.value_usage(*kind);
                Err(format!("takes a single value, not arguments: {}", usage))
            }
            (MarkerSchema::Fields { fields }, None) => parse_fields("", fields),
            (MarkerSchema::Fields { fields }, Some(':')) => parse_fields(&rest[1..], fields),
            (MarkerSchema::Fields { .. }, Some('=')) => {
                let usage = self.schema.usage(true);
                Err(format!("takes named arguments: {}{}", self.name, usage))
            }
            (_, Some(_)) => Err(format!("token does not name marker '{}'", self.name)),
        }
    }

    fn value_usage(&self, kind: ArgKind) -> String {
        format!("{}=<{}>", self.name, kind.type_name())
    }
}

fn parse_fields(args: &str, specs: &[FieldSpec]) -> Result<MarkerValue, String> {
    let mut values = Map::new();

    for arg in split_args(args) {
        let arg = arg.trim();
        if arg.is_empty() {
            continue;
        }
        let (key, raw) = match arg.split_once('=') {
            Some((key, raw)) => (key.trim(), Some(raw)),
            None => (arg, None),
        };
        let spec = specs
            .iter()
            .find(|s| s.name == key)
            .ok_or_else(|| format!("unknown argument '{}'", key))?;

        let value = match (raw, spec.kind) {
            (Some(raw), kind) => kind
                .parse(raw)
                .map_err(|e| format!("argument '{}': {}", key, e))?,
            (None, ArgKind::Bool) => Value::Bool(true),
            (None, kind) => {
                return Err(format!(
                    "argument '{}' needs a value of type {}",
                    key, kind.type_name()
                ));
            }
        };
        values.insert(spec.name.clone(), value);
    }

    if let Some(missing) = specs
        .iter()
        .find(|s| !s.optional && !values.contains_key(&s.name))
    {
        return Err(format!("missing argument '{}'", missing.name));
    }

    Ok(MarkerValue::new(Value::Object(values)))
}

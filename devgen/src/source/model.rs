//! Simplified model of the API types found in the source roots.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::markers::MarkerValue;

/// Markers collected from one doc comment block, keyed by marker name.
///
/// A marker repeated in the same block keeps its last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet(BTreeMap<String, MarkerValue>);

impl MarkerSet {
    pub fn insert(&mut self, name: impl Into<String>, value: MarkerValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&MarkerValue> {
        self.0.get(name)
    }

    /// True if the marker is present and not explicitly set to `false`.
    pub fn is_set(&self, name: &str) -> bool {
        self.0
            .get(name)
            .is_some_and(|v| v.as_bool().unwrap_or(true))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A field or element type, reduced to what the generators care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Bool,
    String,
    /// Integer primitive, keeping its Rust name (`i32`, `u64`, ...).
    Int(String),
    /// Float primitive (`f32`, `f64`).
    Float(String),
    Option(Box<TypeRef>),
    List(Box<TypeRef>),
    /// `HashMap<String, V>` / `BTreeMap<String, V>`.
    Map { kind: String, value: Box<TypeRef> },
    /// Any other path type, by its last segment.
    Named { name: String, args: Vec<TypeRef> },
    /// Something the model does not represent (references, tuples, ...).
    Other,
}

impl TypeRef {
    pub fn from_syn(ty: &syn::Type) -> Self {
        let syn::Type::Path(type_path) = ty else {
            return TypeRef::Other;
        };
        if type_path.qself.is_some() {
            return TypeRef::Other;
        }
        let Some(segment) = type_path.path.segments.last() else {
            return TypeRef::Other;
        };

        let ident = segment.ident.to_string();
        let mut args: Vec<TypeRef> = match &segment.arguments {
            syn::PathArguments::AngleBracketed(angle) => angle
                .args
                .iter()
                .filter_map(|arg| match arg {
                    syn::GenericArgument::Type(t) => Some(TypeRef::from_syn(t)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        match (ident.as_str(), args.len()) {
            ("bool", 0) => TypeRef::Bool,
            ("String", 0) => TypeRef::String,
            (
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
                | "u128" | "usize",
                0,
            ) => TypeRef::Int(ident),
            ("f32" | "f64", 0) => TypeRef::Float(ident),
            ("Option", 1) => TypeRef::Option(Box::new(args.remove(0))),
            ("Vec", 1) => TypeRef::List(Box::new(args.remove(0))),
            ("Box", 1) => args.remove(0),
            ("HashMap" | "BTreeMap", 2) => TypeRef::Map {
                kind: ident,
                value: Box::new(args.remove(1)),
            },
            _ => TypeRef::Named { name: ident, args },
        }
    }

    /// Rust spelling of the type, or `None` for [`TypeRef::Other`].
    pub fn render(&self) -> Option<String> {
        Some(match self {
            TypeRef::Bool => "bool".to_string(),
            TypeRef::String => "String".to_string(),
            TypeRef::Int(name) | TypeRef::Float(name) => name.clone(),
            TypeRef::Option(inner) => format!("Option<{}>", inner.render()?),
            TypeRef::List(inner) => format!("Vec<{}>", inner.render()?),
            TypeRef::Map { kind, value } => format!("{}<String, {}>", kind, value.render()?),
            TypeRef::Named { name, args } if args.is_empty() => name.clone(),
            TypeRef::Named { name, args } => {
                let args = args
                    .iter()
                    .map(TypeRef::render)
                    .collect::<Option<Vec<_>>>()?;
                format!("{}<{}>", name, args.join(", "))
            }
            TypeRef::Other => return None,
        })
    }

    pub fn is_option(&self) -> bool {
        matches!(self, TypeRef::Option(_))
    }

    /// Name of a referenced user type, looking through containers.
    pub fn referenced_type(&self) -> Option<&str> {
        match self {
            TypeRef::Option(inner) | TypeRef::List(inner) => inner.referenced_type(),
            TypeRef::Map { value, .. } => value.referenced_type(),
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A struct field (tuple fields are named by index).
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub docs: Vec<String>,
    pub markers: MarkerSet,
}

impl FieldDecl {
    /// Whether the field is named (not a tuple field).
    pub fn is_named(&self) -> bool {
        !self.name.chars().all(|c| c.is_ascii_digit())
    }
}

#[derive(Debug, Clone)]
pub enum VariantShape {
    Unit,
    Tuple(Vec<TypeRef>),
    Struct(Vec<FieldDecl>),
}

#[derive(Debug, Clone)]
pub struct VariantDecl {
    pub name: String,
    pub docs: Vec<String>,
    pub shape: VariantShape,
}

impl VariantDecl {
    pub fn is_unit(&self) -> bool {
        matches!(self.shape, VariantShape::Unit)
    }
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Struct { fields: Vec<FieldDecl> },
    Enum { variants: Vec<VariantDecl> },
}

/// A struct or enum declared at the top level of a source file.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    /// File the type is declared in.
    pub file: PathBuf,
    pub docs: Vec<String>,
    pub markers: MarkerSet,
    pub kind: TypeKind,
}

impl TypeDecl {
    pub fn fields(&self) -> &[FieldDecl] {
        match &self.kind {
            TypeKind::Struct { fields } => fields,
            TypeKind::Enum { .. } => &[],
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct { .. })
    }

    /// First doc line, used as a description in generated documents.
    pub fn description(&self) -> Option<String> {
        (!self.docs.is_empty()).then(|| self.docs.join(" "))
    }
}

/// One parsed source file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    /// Directory the file lives in; code artifacts for its types go here.
    pub package_dir: PathBuf,
    /// Markers from inner `//!` doc comments.
    pub markers: MarkerSet,
    pub types: Vec<TypeDecl>,
}

//! Marker vocabulary.
//!
//! A marker is a named, typed configuration token. The same machinery
//! serves two purposes:
//!
//! - command line options such as `crds`, `output:crds:artifacts:config=out`
//!   or `paths=./api`, all scoped [`MarkerScope::Package`];
//! - markers written in doc comments of the API types, such as
//!   `/// +kubebuilder:object:root=true`, scoped to a package, type or field.
//!
//! ## Syntax
//!
//! ```text
//! name                      bool markers: true; field markers: all defaults
//! name=value                single anonymous value
//! name:key=value,other=v    named arguments; a bare `key` sets a bool to true
//! ```
//!
//! Lists are written `{a,b,c}` or `a;b;c`.

mod definition;
mod help;
mod registry;
mod value;

pub use definition::{ArgKind, FieldSpec, MarkerDefinition, MarkerSchema, MarkerScope};
pub use help::MarkerHelp;
pub use registry::Registry;
pub use value::MarkerValue;

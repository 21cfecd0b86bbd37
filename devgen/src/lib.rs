//! # devgen
//!
//! Marker-driven orchestration of source code generators for API type
//! definitions.
//!
//! A run is described entirely by command line *markers*:
//!
//! ```text
//! devgen crds:group=workspace.devfile.io deepcopy paths=./api output:crds:artifacts:config=deploy
//! ```
//!
//! Each token activates a generator (`crds`, `deepcopy`), picks where its
//! artifacts go (`output:<generator>:<form>` or the default `output:<form>`)
//! or sets a common runtime option (`paths`, `filter`). Generators read the
//! API types under the source roots together with the `+markers` found in
//! their doc comments.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use devgen::{ExecutionRuntime, OptionsRegistry, RuntimeBuilder};
//!
//! let options = OptionsRegistry::builtin()?;
//! let config = RuntimeBuilder::new(&options).build(&["crds", "paths=./api"])?;
//! let report = ExecutionRuntime::new(config, &options).run();
//! assert!(!report.had_errors());
//! ```
//!
//! ## Architecture
//!
//! - [`markers`] - marker definitions, values and the ordered [`Registry`]
//! - [`generator`] - the [`Generator`] capability and the built-in generators
//! - [`output`] - output forms and configured [`OutputRule`]s
//! - [`options`] - the merged command line namespace
//! - [`runtime`] - token parsing and execution
//! - [`help`] - marker documentation rendering
//! - [`source`] - scanning and parsing of the source roots
//! - [`error`] - error types

pub mod error;
pub mod generator;
pub mod help;
pub mod markers;
pub mod options;
pub mod output;
pub mod runtime;
pub mod source;

// Re-export main types for convenience
pub use error::{
    GenerateError, GeneratorFailure, OptionsError, OutputError, RegistryError, SourceError,
};
pub use generator::{Artifact, ArtifactKind, GenerationContext, Generator, GeneratorRegistry};
pub use help::{HelpLevel, HelpPresenter};
pub use markers::{MarkerDefinition, MarkerValue, Registry};
pub use options::{OptionRole, OptionsRegistry};
pub use output::{OutputForm, OutputRule, OutputRuleRegistry};
pub use runtime::{ExecutableConfiguration, ExecutionRuntime, RunReport, RuntimeBuilder};
pub use source::SourceTree;

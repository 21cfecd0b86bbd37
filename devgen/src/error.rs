//! Error types for marker registration, option parsing and generation.
//!
//! Each stage of the pipeline has its own error type so callers can tell a
//! defect in the built-in generator set (a [`RegistryError`]) apart from bad
//! user input (an [`OptionsError`]) and from a generator that failed while
//! running (a [`GenerateError`] or [`OutputError`]).

use std::path::PathBuf;
use thiserror::Error;

/// Error raised while building a marker registry.
///
/// These indicate a programming error in the generator or output rule set,
/// never a problem with user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two definitions share a name.
    #[error("marker '{name}' is already registered")]
    DuplicateMarker { name: String },

    /// A definition name is not a valid marker path.
    #[error("invalid marker name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

/// Error raised while turning raw option tokens into a runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// The token does not name any registered marker.
    #[error("unknown option \"{token}\"")]
    UnknownOption { token: String },

    /// The token names a marker but its arguments could not be parsed.
    #[error("unable to parse option \"{token}\": {message}")]
    InvalidValue { token: String, message: String },

    /// Two different output forms were requested for the same generator.
    #[error("conflicting output rules for {generator}: '{first}' and '{second}'")]
    AmbiguousOutput {
        generator: String,
        first: String,
        second: String,
    },

    /// An output override names a generator that was never activated.
    #[error("output rule given for non-invoked generator \"{generator}\"")]
    NonInvokedGenerator { generator: String },

    /// None of the tokens activated a generator.
    #[error("no generators specified")]
    NoGenerators,
}

impl OptionsError {
    /// Create an unknown option error.
    pub fn unknown(token: impl Into<String>) -> Self {
        Self::UnknownOption {
            token: token.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid(token: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            token: token.into(),
            message: message.into(),
        }
    }
}

/// Error while scanning or parsing the source roots.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A source root does not exist.
    #[error("source root not found: {path}")]
    RootNotFound { path: PathBuf },

    /// The `filter` glob could not be compiled.
    #[error("invalid filter pattern '{pattern}': {message}")]
    InvalidFilter { pattern: String, message: String },

    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file is not valid Rust.
    #[error("syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    /// A known source marker carries arguments that do not parse.
    #[error("invalid marker in {path}: {message}")]
    Marker { path: PathBuf, message: String },

    /// Error from the directory walker.
    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Error reported by a generator.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The generator's options did not decode into its configuration.
    #[error("invalid options: {0}")]
    Options(String),

    /// The generator could not render an artifact.
    #[error("failed to render {artifact}: {message}")]
    Render { artifact: String, message: String },

    /// The generator refused a source construct.
    #[error("{type_name}: {message}")]
    Source { type_name: String, message: String },
}

impl GenerateError {
    /// Create a render error.
    pub fn render(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Create a source error for a named type.
    pub fn source(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

/// Error opening or writing an output destination.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The destination could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination was opened but writing failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single generator during a run.
///
/// Output failures are attributed to the generator that produced the
/// artifact.
#[derive(Debug, Error)]
pub enum GeneratorFailure {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

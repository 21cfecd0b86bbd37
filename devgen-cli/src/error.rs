//! Error types for the CLI.
//!
//! Library errors are wrapped as-is; the CLI only adds configuration file
//! failures and the aggregate "generation failed" outcome.

use std::path::PathBuf;
use thiserror::Error;

use devgen::{OptionsError, RegistryError};

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// The built-in generator set could not be assembled.
    #[error("Invalid generator set: {0}")]
    Registry(#[from] RegistryError),

    /// A command line token was rejected.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// Error loading or writing configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Marker documentation could not be serialized.
    #[error("Failed to render help: {0}")]
    Help(#[from] serde_json::Error),

    /// At least one generator, or the source tree, reported errors.
    #[error("not all generators ran successfully ({failed} error(s))")]
    GenerationFailed { failed: usize },

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Whether the one-line usage should follow the error message.
    ///
    /// Generation failures are domain errors and already reported per
    /// generator; a broken generator set is not the user's mistake.
    pub fn is_usage_error(&self) -> bool {
        !matches!(
            self,
            CliError::GenerationFailed { .. } | CliError::Registry(_)
        )
    }
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Refusing to overwrite an existing file.
    #[error("Configuration file already exists: {path} (use --force to overwrite)")]
    AlreadyExists { path: PathBuf },

    /// IO error reading or writing config.
    #[error("Failed to access config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }
}

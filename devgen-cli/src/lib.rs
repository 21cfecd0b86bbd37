//! # devgen-cli
//!
//! Command line front-end for the `devgen` generators.
//!
//! This crate provides the pieces of the `devgen` binary that are not
//! generation logic: argument parsing, configuration files, logging setup
//! and error reporting.
//!
//! ## Architecture
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - Configuration management and TOML parsing
//! - [`logging`] - `tracing` subscriber initialization
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use cli::Cli;
pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};

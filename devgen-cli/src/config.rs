//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `devgen.toml` files
//! and merging it with command-line arguments.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "devgen.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Option tokens applied before the command line.
    pub options: OptionsConfig,

    /// Log filter and terminal colors.
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// Raw option tokens, e.g. `paths=./api`.
    pub defaults: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directives used when no environment filter is set.
    pub level: String,

    /// Colored terminal output.
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            color: true,
        }
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// `--no-color` was given.
    pub no_color: bool,
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// Without a path the default file is tried and its absence yields the
    /// default configuration. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config_path = match path {
            Some(path) if !path.exists() => return Err(ConfigError::not_found(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if args.no_color {
            config.logging.color = false;
        }
        config
    }

    /// Configured default tokens followed by the command line tokens.
    ///
    /// Later tokens win, so the command line overrides the file.
    pub fn tokens(config: &Config, cli_tokens: &[String]) -> Vec<String> {
        config
            .options
            .defaults
            .iter()
            .chain(cli_tokens)
            .cloned()
            .collect()
    }

    /// Write the default configuration file.
    pub fn init(path: &Path, force: bool) -> Result<(), ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        std::fs::write(path, Self::default_config_content()).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# devgen configuration file

[options]
# Option tokens applied before the ones given on the command line.
# Command line tokens targeting the same marker win.
defaults = [
    # "paths=./pkg/apis",
    # "output:artifacts:config=./deploy/crds",
]

[logging]
# Log filter (overridden by the DEVGEN_LOG and RUST_LOG environment variables)
level = "warn"

# Colored terminal output
color = true
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.options.defaults.is_empty());
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.color);
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config: Config = toml::from_str(ConfigManager::default_config_content()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[options]
defaults = ["paths=./api", "crds:group=example.com"]

[logging]
level = "devgen=debug"
color = false
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.options.defaults,
            vec!["paths=./api", "crds:group=example.com"]
        );
        assert_eq!(config.logging.level, "devgen=debug");
        assert!(!config.logging.color);
    }

    #[test]
    fn test_tokens_put_defaults_first() {
        let config = Config {
            options: OptionsConfig {
                defaults: vec!["paths=./api".to_string()],
            },
            ..Default::default()
        };
        let cli = ["crds".to_string(), "paths=./other".to_string()];
        let tokens = ConfigManager::tokens(&config, &cli);
        assert_eq!(tokens, vec!["paths=./api", "crds", "paths=./other"]);
    }

    #[test]
    fn test_merge_cli_args() {
        let merged = ConfigManager::merge_cli_args(Config::default(), &CliArgs { no_color: true });
        assert!(!merged.logging.color);

        let merged = ConfigManager::merge_cli_args(Config::default(), &CliArgs::default());
        assert!(merged.logging.color);
    }

    #[test]
    fn test_load_missing_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            ConfigManager::load(Some(&missing)),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[options\n").unwrap();
        assert!(matches!(
            ConfigManager::load(Some(&path)),
            Err(ConfigError::InvalidToml { .. })
        ));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);

        ConfigManager::init(&path, false).unwrap();
        let loaded = ConfigManager::load(Some(&path)).unwrap();
        assert_eq!(loaded, Config::default());

        assert!(matches!(
            ConfigManager::init(&path, false),
            Err(ConfigError::AlreadyExists { .. })
        ));
        std::fs::write(&path, "").unwrap();
        ConfigManager::init(&path, true).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            ConfigManager::default_config_content()
        );
    }
}

//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Command-line arguments

use crate::cli::{OutputFormat, ValidateArgs};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use specguard_core::{OpenApiVersion, ValidatorConfig};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Validation settings
    pub validation: ValidationConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format, used when `--output` is not given
    pub format: Option<OutputFormat>,

    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); the verbosity flags win
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

/// Validation defaults applied before the command-line flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validate as this version instead of reading the `openapi` field
    pub spec_version: Option<OpenApiVersion>,

    /// Longest reference chain followed before giving up
    pub max_resolution_depth: usize,

    /// Fetch referenced documents over HTTP
    pub allow_remote: bool,

    /// Timeout in seconds for each remote fetch
    pub timeout_secs: u64,

    /// Check schema defaults against their schema
    pub check_defaults: bool,

    /// Semantic rules that are not run
    pub disabled_rules: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            progress: true,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let core = ValidatorConfig::default();
        Self {
            spec_version: core.version,
            max_resolution_depth: core.max_resolution_depth,
            allow_remote: true,
            timeout_secs: 30,
            check_defaults: core.check_defaults,
            disabled_rules: core.disabled_rules,
        }
    }
}

impl ValidationConfig {
    /// Layer the validate command's flags over these defaults
    pub fn merge_args(&self, args: &ValidateArgs) -> Self {
        let mut merged = self.clone();
        if args.spec_version.is_some() {
            merged.spec_version = args.spec_version;
        }
        if let Some(depth) = args.max_depth {
            merged.max_resolution_depth = depth;
        }
        if let Some(timeout) = args.timeout {
            merged.timeout_secs = timeout;
        }
        if args.no_remote {
            merged.allow_remote = false;
        }
        if args.skip_defaults {
            merged.check_defaults = false;
        }
        for rule in &args.disabled_rules {
            if !merged.disabled_rules.contains(rule) {
                merged.disabled_rules.push(rule.clone());
            }
        }
        merged
    }

    /// The settings understood by the core validator
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            version: self.spec_version,
            max_resolution_depth: self.max_resolution_depth,
            check_defaults: self.check_defaults,
            disabled_rules: self.disabled_rules.clone(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let extension = path.extension().and_then(|s| s.to_str());
        let config = if matches!(extension, Some("yaml") | Some("yml")) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in &Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".specguard.yaml"),
            PathBuf::from(".specguard.yml"),
            PathBuf::from(".specguard.json"),
        ];

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let specguard_dir = config_dir.join("specguard");
            paths.push(specguard_dir.join("config.yaml"));
            paths.push(specguard_dir.join("config.json"));
        }

        paths
    }
}

//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use specguard_core::OpenApiVersion;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Specguard CLI - OpenAPI 3.0 and 3.1 document validation
///
/// Validates API description documents against the structural and semantic
/// rules of their OpenAPI version and reports every violation found.
#[derive(Parser, Debug)]
#[command(
    name = "specguard",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SPECGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: human]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate an OpenAPI document
    Validate(ValidateArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path or http(s) URL of the document (JSON or YAML)
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Validate as this OpenAPI version instead of reading the 'openapi' field
    #[arg(long, value_name = "VERSION")]
    pub spec_version: Option<OpenApiVersion>,

    /// Do not fetch referenced documents over HTTP
    #[arg(long)]
    pub no_remote: bool,

    /// Skip checking schema defaults against their schema
    #[arg(long)]
    pub skip_defaults: bool,

    /// Semantic rule to skip (can be used multiple times)
    #[arg(long = "disable-rule", value_name = "RULE")]
    pub disabled_rules: Vec<String>,

    /// Longest reference chain followed before giving up
    #[arg(long, value_name = "DEPTH")]
    pub max_depth: Option<usize>,

    /// Timeout in seconds for fetching remote documents
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Show the per-branch errors of failed oneOf/anyOf checks
    #[arg(long)]
    pub show_context: bool,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Verify that the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["specguard", "-vv", "validate", "openapi.yaml"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["specguard", "--quiet", "validate", "openapi.yaml"]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_validate_arguments() {
        let cli = Cli::parse_from([
            "specguard",
            "validate",
            "https://example.com/openapi.json",
            "--spec-version",
            "3.1",
            "--no-remote",
            "--disable-rule",
            "duplicate-paths",
            "--disable-rule",
            "schema-default",
            "--output",
            "json-pretty",
        ]);

        assert_eq!(cli.output, Some(OutputFormat::JsonPretty));
        let Commands::Validate(args) = cli.command else {
            panic!("expected the validate command");
        };
        assert_eq!(args.source, "https://example.com/openapi.json");
        assert_eq!(args.spec_version, Some(OpenApiVersion::V31));
        assert!(args.no_remote);
        assert_eq!(args.disabled_rules, vec!["duplicate-paths", "schema-default"]);
    }

    #[test]
    fn test_rejects_unknown_spec_version() {
        let result = Cli::try_parse_from(["specguard", "validate", "openapi.yaml", "--spec-version", "2.0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_names() {
        let format: OutputFormat = serde_yaml::from_str("json-pretty").unwrap();
        assert_eq!(format, OutputFormat::JsonPretty);
        assert_eq!(
            OutputFormat::JsonPretty.to_possible_value().unwrap().get_name(),
            "json-pretty"
        );
    }
}

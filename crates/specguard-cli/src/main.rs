//! Specguard CLI - Command-line interface for OpenAPI document validation
//!
//! This is the main entry point for the Specguard CLI application, providing
//! commands for validating OpenAPI 3.0 and 3.1 documents from files or URLs.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;
mod provider;

use cli::{Cli, Commands, OutputFormat};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    let code = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => {
            // Set up colored output
            control::set_override(cli.use_color() && config.output.color);

            // Held until exit so buffered file logs are flushed
            let _guard = init_logging(&cli, &config);

            report(run(cli, config))
        }
        Err(e) => report(Err(e)),
    };

    process::exit(code);
}

/// Print a failure and turn the result into an exit code
fn report(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            e.exit_code()
        }
    }
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = cli
        .output
        .or(config.output.format)
        .unwrap_or(OutputFormat::Human);
    let mut output = OutputWriter::new(
        format,
        control::SHOULD_COLORIZE.should_colorize(),
        cli.quiet,
        config.output.progress,
    );

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    // Handle the subcommand
    match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args, &mut std::io::stdout()),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Option<WorkerGuard> {
    // Create logging configuration from CLI args, the config file and environment
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_file(&config.logging, cli.verbosity_level());
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    match logging::init_logging(logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["specguard", "-v", "validate", "openapi.yaml"]);
        assert_eq!(cli.verbosity_level(), 1);
        assert!(matches!(cli.command, Commands::Validate(_)));

        let cli = Cli::parse_from(["specguard", "completions", "zsh"]);
        assert!(matches!(cli.command, Commands::Completions(_)));
    }

    #[test]
    fn test_failures_map_to_exit_codes() {
        assert_eq!(report(Ok(())), 0);
        assert_eq!(report(Err(error::Error::Invalid { count: 2 })), 2);
        assert_eq!(report(Err(error::Error::invalid_args("bad source"))), 64);
    }
}

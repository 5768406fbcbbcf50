//! Validate command handler

use crate::cli::ValidateArgs;
use crate::config::{Config, ValidationConfig};
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, ValidationSummary};
use crate::provider::{HttpProvider, HttpProviderConfig};
use specguard_core::loader::file_origin;
use specguard_core::{ChainProvider, FileProvider, Report, Validator};
use std::path::PathBuf;
use tracing::{info, instrument};
use url::Url;

/// Where the root document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Remote(Url),
}

impl Source {
    /// Interpret a command-line source as a local path or an http(s) URL
    pub fn parse(raw: &str) -> Result<Self> {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Remote(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Self::File)
                .map_err(|_| Error::invalid_args(format!("'{}' is not a local file URL", raw))),
            // Single letters are Windows drive prefixes
            Ok(url) if url.scheme().len() > 1 => Err(Error::invalid_args(format!(
                "Unsupported source scheme '{}'; use a file path or an http(s) URL",
                url.scheme()
            ))),
            _ => Ok(Self::File(PathBuf::from(raw))),
        }
    }

    /// Origin URL the validator resolves relative references against
    pub fn origin(&self) -> Result<Url> {
        match self {
            Self::File(path) => {
                if !path.is_file() {
                    return Err(Error::FileNotFound { path: path.clone() });
                }
                Ok(file_origin(path)?)
            }
            Self::Remote(url) => Ok(url.clone()),
        }
    }

    fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Build a validator whose providers follow the settings
pub fn build_validator(settings: &ValidationConfig) -> Result<Validator> {
    let mut providers = ChainProvider::new().with(FileProvider::new());
    if settings.allow_remote {
        providers = providers.with(HttpProvider::new(HttpProviderConfig {
            timeout_secs: settings.timeout_secs,
            ..HttpProviderConfig::default()
        })?);
    }
    Ok(Validator::with_config(settings.validator_config()).with_provider(providers))
}

/// Validate `source`, returning the report of a document that could be
/// fetched and whose version could be determined
#[instrument(skip(settings), fields(source = %raw_source))]
pub fn validate_source(raw_source: &str, settings: &ValidationConfig) -> Result<Report> {
    let source = Source::parse(raw_source)?;
    if source.is_remote() && !settings.allow_remote {
        return Err(Error::invalid_args(
            "remote fetching is disabled but the source is an http(s) URL",
        ));
    }
    let origin = source.origin()?;
    let validator = build_validator(settings)?;

    let timer = Timer::with_details("validate_document", origin.as_str());
    let report = validator.report_url(&origin)?;
    timer.finish();

    info!(
        version = ?report.version,
        errors = report.errors.len(),
        "Validation finished"
    );
    Ok(report)
}

/// Handle the validate command
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let settings = config.validation.merge_args(&args);
    output.info(&format!("Validating {}", args.source))?;

    let spinner = output.spinner(&format!("Validating {}...", args.source));
    let result = validate_source(&args.source, &settings);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let report = result?;

    let summary = ValidationSummary::new(args.source.as_str(), &report, args.show_context);
    output.summary(&summary)?;

    if summary.valid {
        Ok(())
    } else {
        Err(Error::Invalid {
            count: summary.error_count,
        })
    }
}

//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use specguard_core::{LoaderError, ProviderError, ValidateError, VersionDetectionError};
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The document was validated and violations were found
    #[error("Document is invalid: {count} error(s) found")]
    Invalid { count: usize },

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The document could not be parsed as YAML or JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The OpenAPI version could not be determined
    #[error("Version error: {0}")]
    Version(#[from] VersionDetectionError),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Invalid { .. } => 2,
            Self::FileNotFound { .. } => 3,
            Self::Parse(_) => 4,
            Self::Config(_) => 5,
            Self::Version(_) => 6,
            Self::Network(_) => 10,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::InvalidArgs(_) => 64,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

impl From<LoaderError> for Error {
    fn from(error: LoaderError) -> Self {
        match error {
            LoaderError::IoError { path, source } if source.kind() == io::ErrorKind::NotFound => {
                Self::FileNotFound { path }
            }
            LoaderError::IoError { source, .. } => Self::Io(source),
            LoaderError::UnsupportedFormat { .. } => Self::invalid_args(error.to_string()),
            other => Self::Parse(other.to_string()),
        }
    }
}

impl From<ProviderError> for Error {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::NotFound { origin } if origin.scheme() == "file" => Self::FileNotFound {
                path: origin
                    .to_file_path()
                    .unwrap_or_else(|_| PathBuf::from(origin.path())),
            },
            ProviderError::Parse { source, .. } => source.into(),
            ProviderError::UnsupportedScheme { .. } => Self::invalid_args(error.to_string()),
            other => Self::network(other.to_string()),
        }
    }
}

impl From<ValidateError> for Error {
    fn from(error: ValidateError) -> Self {
        match error {
            ValidateError::Version(error) => error.into(),
            ValidateError::Invalid(invalid) => Self::Invalid { count: invalid.len() },
            ValidateError::Fetch(error) => error.into(),
            ValidateError::Load(error) => error.into(),
        }
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_exit_codes_are_distinct_for_failure_classes() {
        let invalid = Error::Invalid { count: 3 };
        let version = Error::from(VersionDetectionError::Missing);
        let network = Error::network("connection refused");

        assert_eq!(invalid.exit_code(), 2);
        assert_eq!(version.exit_code(), 6);
        assert_eq!(network.exit_code(), 10);
        assert!(!invalid.should_show_help());
        assert!(Error::invalid_args("bad source").should_show_help());
    }

    #[test]
    fn test_missing_file_maps_to_file_not_found() {
        let io = io::Error::new(io::ErrorKind::NotFound, "gone");
        let error = Error::from(LoaderError::io_error(PathBuf::from("api.yaml"), io));
        assert!(matches!(error, Error::FileNotFound { ref path } if path == &PathBuf::from("api.yaml")));
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_parse_failure_maps_to_parse() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let origin = Url::parse("https://example.com/api.json").unwrap();
        let error = Error::from(ProviderError::parse(&origin, LoaderError::json_parse_error("api.json", source)));
        assert!(matches!(error, Error::Parse(_)));
        assert_eq!(error.exit_code(), 4);
    }

    #[test]
    fn test_remote_not_found_is_network_error() {
        let origin = Url::parse("https://example.com/api.json").unwrap();
        assert!(matches!(Error::from(ProviderError::not_found(&origin)), Error::Network(_)));

        let file = Url::parse("file:///tmp/absent.yaml").unwrap();
        assert!(matches!(
            Error::from(ProviderError::not_found(&file)),
            Error::FileNotFound { .. }
        ));
    }

    #[test]
    fn test_format_error_without_color() {
        let error = Error::config("unknown key");
        assert_eq!(format_error(&error, false), "Error: Configuration error: unknown key");
    }
}

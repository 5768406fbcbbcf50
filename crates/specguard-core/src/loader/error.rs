//! Error types for document loading and fetching
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors raised while turning text into a document tree
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML document '{origin}': {source}")]
    YamlParseError {
        origin: String,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON document '{origin}': {source}")]
    JsonParseError {
        origin: String,
        source: serde_json::Error,
    },

    /// YAML that cannot be represented as JSON (e.g. non-finite floats, complex keys)
    #[error("Document '{origin}' cannot be represented as JSON: {reason}")]
    ConversionError { origin: String, reason: String },

    /// Unsupported file format
    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },
}

impl LoaderError {
    /// Create an I/O error with path context
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::IoError {
            path,
            source: error,
        }
    }

    /// Create a YAML parsing error with origin context
    pub fn yaml_parse_error(origin: impl Into<String>, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            origin: origin.into(),
            source: error,
        }
    }

    /// Create a JSON parsing error with origin context
    pub fn json_parse_error(origin: impl Into<String>, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            origin: origin.into(),
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    /// Get the file path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::IoError { path, .. } => Some(path),
            Self::UnsupportedFormat { path } => Some(path),
            _ => None,
        }
    }

    /// Whether the error stems from malformed content rather than access
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::YamlParseError { .. } | Self::JsonParseError { .. } | Self::ConversionError { .. }
        )
    }
}

/// Errors raised by a [`DocumentProvider`](super::DocumentProvider)
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("document '{origin}' not found")]
    NotFound { origin: Url },

    #[error("failed to fetch '{origin}': {reason}")]
    Transport { origin: Url, reason: String },

    #[error("failed to parse '{origin}': {source}")]
    Parse { origin: Url, source: LoaderError },

    #[error("no provider handles the '{scheme}' scheme of '{origin}'")]
    UnsupportedScheme { origin: Url, scheme: String },
}

impl ProviderError {
    pub fn not_found(origin: &Url) -> Self {
        Self::NotFound {
            origin: origin.clone(),
        }
    }

    pub fn transport(origin: &Url, reason: impl Into<String>) -> Self {
        Self::Transport {
            origin: origin.clone(),
            reason: reason.into(),
        }
    }

    pub fn parse(origin: &Url, source: LoaderError) -> Self {
        Self::Parse {
            origin: origin.clone(),
            source,
        }
    }

    pub fn unsupported_scheme(origin: &Url) -> Self {
        Self::UnsupportedScheme {
            origin: origin.clone(),
            scheme: origin.scheme().to_string(),
        }
    }

    pub fn origin(&self) -> &Url {
        match self {
            Self::NotFound { origin }
            | Self::Transport { origin, .. }
            | Self::Parse { origin, .. }
            | Self::UnsupportedScheme { origin, .. } => origin,
        }
    }

    /// A chained provider may try the next provider after these errors
    pub fn is_unhandled(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::UnsupportedScheme { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = LoaderError::unsupported_format(PathBuf::from("api.txt"));
        assert_eq!(
            error.to_string(),
            "Unsupported file format for 'api.txt'. Expected .yaml, .yml, or .json"
        );
        assert_eq!(error.path(), Some(&PathBuf::from("api.txt")));
        assert!(!error.is_parse_error());
    }

    #[test]
    fn test_provider_error_origin() {
        let origin = Url::parse("https://example.com/api.yaml").unwrap();
        let error = ProviderError::unsupported_scheme(&Url::parse("ftp://example.com/a").unwrap());
        assert!(error.is_unhandled());
        assert!(error.to_string().contains("'ftp' scheme"));

        let error = ProviderError::transport(&origin, "connection refused");
        assert_eq!(error.origin(), &origin);
        assert!(!error.is_unhandled());
        assert_eq!(
            error.to_string(),
            "failed to fetch 'https://example.com/api.yaml': connection refused"
        );
    }
}

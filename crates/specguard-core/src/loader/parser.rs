//! Document parsing for YAML and JSON formats
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;
use url::Url;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| LoaderError::unsupported_format(path.to_path_buf()))
    }

    /// Detect format from the last path segment of a URL
    pub fn from_url(origin: &Url) -> Option<Self> {
        origin
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|name| name.rsplit_once('.'))
            .and_then(|(_, extension)| Self::from_extension(extension))
    }

    fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yaml", "yml"],
            Format::Json => &["json"],
        }
    }
}

/// Parser turning YAML or JSON text into a document tree
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentParser;

impl DocumentParser {
    /// Create a new document parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a document file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> LoaderResult<Value> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;
        let origin = path.display().to_string();

        match Format::from_path(path) {
            Ok(format) => self.parse_content(&content, format, &origin),
            Err(_) => self.parse_with_fallback(&content, None, &origin).map(|(value, _)| value),
        }
    }

    /// Parse document content with explicit format
    pub fn parse_content(&self, content: &str, format: Format, origin: &str) -> LoaderResult<Value> {
        match format {
            Format::Yaml => self.parse_yaml(content, origin),
            Format::Json => self.parse_json(content, origin),
        }
    }

    /// Parse YAML content
    pub fn parse_yaml(&self, content: &str, origin: &str) -> LoaderResult<Value> {
        // First parse as YAML Value to catch YAML-specific errors
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| LoaderError::yaml_parse_error(origin, e))?;

        // Integer mapping keys such as response codes become strings here
        serde_json::to_value(yaml_value).map_err(|e| LoaderError::ConversionError {
            origin: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Parse JSON content
    pub fn parse_json(&self, content: &str, origin: &str) -> LoaderResult<Value> {
        serde_json::from_str(content).map_err(|e| LoaderError::json_parse_error(origin, e))
    }

    /// Parse with a format hint, falling back to JSON then YAML
    pub fn parse_with_fallback(
        &self,
        content: &str,
        hint: Option<Format>,
        origin: &str,
    ) -> LoaderResult<(Value, Format)> {
        let hinted = hint.map(|format| (format, self.parse_content(content, format, origin)));
        let hint_error = match hinted {
            Some((format, Ok(value))) => return Ok((value, format)),
            Some((_, Err(error))) => Some(error),
            None => None,
        };

        if hint != Some(Format::Json) {
            if let Ok(value) = self.parse_json(content, origin) {
                return Ok((value, Format::Json));
            }
        }

        if hint != Some(Format::Yaml) {
            match self.parse_yaml(content, origin) {
                Ok(value) => return Ok((value, Format::Yaml)),
                Err(error) => return Err(hint_error.unwrap_or(error)),
            }
        }

        // Only reachable with a YAML hint whose parse failed
        Err(hint_error.unwrap_or_else(|| LoaderError::ConversionError {
            origin: origin.to_string(),
            reason: "content is neither JSON nor YAML".to_string(),
        }))
    }
}

//! HTTP document provider
//!
//! Fetches `http` and `https` documents for the validator, blocking on each
//! request. Other schemes are left to the next provider in the chain.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::Value;
use specguard_core::{DocumentParser, DocumentProvider, Format, ProviderError};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the HTTP provider
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sent as the `User-Agent` header
    pub user_agent: String,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("specguard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Provider fetching documents over HTTP(S)
#[derive(Debug)]
pub struct HttpProvider {
    client: Client,
    parser: DocumentParser,
}

impl HttpProvider {
    /// Create a new HTTP provider
    pub fn new(config: HttpProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| Error::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            parser: DocumentParser::new(),
        })
    }
}

impl DocumentProvider for HttpProvider {
    fn fetch(&self, origin: &Url) -> std::result::Result<Value, ProviderError> {
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ProviderError::unsupported_scheme(origin));
        }

        debug!(origin = %origin, "fetching remote document");
        let response = self
            .client
            .get(origin.clone())
            .send()
            .map_err(|e| ProviderError::transport(origin, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(ProviderError::not_found(origin));
        }
        if !status.is_success() {
            warn!(origin = %origin, status = status.as_u16(), "remote document request failed");
            return Err(ProviderError::transport(origin, format!("HTTP status {}", status)));
        }

        let hint = Format::from_url(origin).or_else(|| {
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .and_then(format_from_content_type)
        });
        let body = response
            .text()
            .map_err(|e| ProviderError::transport(origin, e.to_string()))?;

        let (document, format) = self
            .parser
            .parse_with_fallback(&body, hint, origin.as_str())
            .map_err(|e| ProviderError::parse(origin, e))?;
        debug!(origin = %origin, format = ?format, bytes = body.len(), "fetched remote document");
        Ok(document)
    }
}

/// Document format named by a `Content-Type` header value
fn format_from_content_type(content_type: &str) -> Option<Format> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    if essence == "application/json" || essence.ends_with("+json") {
        Some(Format::Json)
    } else if essence.contains("yaml") {
        Some(Format::Yaml)
    } else {
        None
    }
}

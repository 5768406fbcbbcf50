//! Document providers: fetch a document tree by origin URL
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::ProviderError;
use crate::loader::parser::DocumentParser;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Source of documents addressed by origin
///
/// Implementations are called at most once per origin and validation run;
/// the resolution context keeps what they return for the rest of the run.
pub trait DocumentProvider: Send + Sync {
    /// Fetch and parse the document at `origin` (the URL carries no fragment)
    fn fetch(&self, origin: &Url) -> Result<Value, ProviderError>;
}

impl<P: DocumentProvider + ?Sized> DocumentProvider for Box<P> {
    fn fetch(&self, origin: &Url) -> Result<Value, ProviderError> {
        (**self).fetch(origin)
    }
}

fn without_fragment(origin: &Url) -> Url {
    let mut origin = origin.clone();
    origin.set_fragment(None);
    origin
}

/// Provider serving pre-registered documents
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvider {
    documents: HashMap<Url, Value>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under `origin`, builder style
    pub fn with_document(mut self, origin: Url, document: Value) -> Self {
        self.insert(origin, document);
        self
    }

    pub fn insert(&mut self, origin: Url, document: Value) {
        self.documents.insert(without_fragment(&origin), document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentProvider for InMemoryProvider {
    fn fetch(&self, origin: &Url) -> Result<Value, ProviderError> {
        self.documents
            .get(&without_fragment(origin))
            .cloned()
            .ok_or_else(|| ProviderError::not_found(origin))
    }
}

/// Provider reading `file://` origins from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FileProvider {
    parser: DocumentParser,
}

impl FileProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentProvider for FileProvider {
    fn fetch(&self, origin: &Url) -> Result<Value, ProviderError> {
        if origin.scheme() != "file" {
            return Err(ProviderError::unsupported_scheme(origin));
        }
        let path = origin
            .to_file_path()
            .map_err(|_| ProviderError::transport(origin, "not a local file path"))?;
        if !path.is_file() {
            return Err(ProviderError::not_found(origin));
        }

        debug!(path = %path.display(), "reading document from disk");
        self.parser
            .parse_file(&path)
            .map_err(|e| ProviderError::parse(origin, e))
    }
}

/// Provider trying a sequence of providers in order
///
/// The next provider is consulted only when the previous one reports
/// `NotFound` or `UnsupportedScheme`; any other failure is final.
#[derive(Default)]
pub struct ChainProvider {
    providers: Vec<Box<dyn DocumentProvider>>,
}

impl ChainProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl DocumentProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn push(&mut self, provider: Box<dyn DocumentProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ChainProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainProvider")
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl DocumentProvider for ChainProvider {
    fn fetch(&self, origin: &Url) -> Result<Value, ProviderError> {
        let mut last = None;
        for provider in &self.providers {
            match provider.fetch(origin) {
                Ok(document) => return Ok(document),
                // NotFound outranks UnsupportedScheme
                Err(error @ ProviderError::NotFound { .. }) => last = Some(error),
                Err(error @ ProviderError::UnsupportedScheme { .. }) => {
                    last.get_or_insert(error);
                }
                Err(error) => return Err(error),
            }
        }
        Err(last.unwrap_or_else(|| ProviderError::not_found(origin)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_in_memory_provider() {
        let provider = InMemoryProvider::new()
            .with_document(url("https://example.com/schemas.yaml"), json!({"Pet": {}}));

        assert_eq!(provider.len(), 1);
        assert_eq!(
            provider.fetch(&url("https://example.com/schemas.yaml#/Pet")).unwrap(),
            json!({"Pet": {}})
        );
        assert!(matches!(
            provider.fetch(&url("https://example.com/other.yaml")),
            Err(ProviderError::NotFound { .. })
        ));
    }

    #[test]
    fn test_file_provider() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schemas.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Pet:\n  type: object").unwrap();

        let provider = FileProvider::new();
        let origin = Url::from_file_path(&path).unwrap();
        assert_eq!(
            provider.fetch(&origin).unwrap(),
            json!({"Pet": {"type": "object"}})
        );

        let missing = Url::from_file_path(dir.path().join("missing.yaml")).unwrap();
        assert!(matches!(
            provider.fetch(&missing),
            Err(ProviderError::NotFound { .. })
        ));
        assert!(matches!(
            provider.fetch(&url("https://example.com/a.yaml")),
            Err(ProviderError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_file_provider_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();

        let error = FileProvider::new()
            .fetch(&Url::from_file_path(&path).unwrap())
            .unwrap_err();
        assert!(matches!(error, ProviderError::Parse { .. }));
    }

    #[test]
    fn test_chain_provider_falls_through() {
        let first = InMemoryProvider::new().with_document(url("memory://a/a.json"), json!(1));
        let second = InMemoryProvider::new().with_document(url("memory://a/b.json"), json!(2));
        let chain = ChainProvider::new().with(first).with(FileProvider::new()).with(second);

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.fetch(&url("memory://a/a.json")).unwrap(), json!(1));
        assert_eq!(chain.fetch(&url("memory://a/b.json")).unwrap(), json!(2));
        assert!(matches!(
            chain.fetch(&url("memory://a/c.json")),
            Err(ProviderError::NotFound { .. })
        ));
        assert!(matches!(
            ChainProvider::new().fetch(&url("memory://a/c.json")),
            Err(ProviderError::NotFound { .. })
        ));
    }

    #[test]
    fn test_chain_provider_prefers_not_found() {
        let chain = ChainProvider::new().with(InMemoryProvider::new()).with(FileProvider::new());
        assert!(matches!(
            chain.fetch(&url("memory://a/c.json")),
            Err(ProviderError::NotFound { .. })
        ));

        let files_only = ChainProvider::new().with(FileProvider::new());
        assert!(matches!(
            files_only.fetch(&url("https://example.com/api.json")),
            Err(ProviderError::UnsupportedScheme { .. })
        ));
    }
}

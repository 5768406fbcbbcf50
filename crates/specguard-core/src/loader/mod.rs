//! Document loading: parsing text into trees and fetching documents by origin
//!
//! The resolver never touches the filesystem or the network itself; it asks a
//! [`DocumentProvider`] for any document it has not seen during the current
//! run. Providers in this module cover in-memory fixtures, local files and
//! ordered fallbacks between providers.
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;
pub mod provider;

pub use error::{LoaderError, LoaderResult, ProviderError};
pub use parser::{DocumentParser, Format};
pub use provider::{ChainProvider, DocumentProvider, FileProvider, InMemoryProvider};

use std::path::Path;
use url::Url;

/// Turn a filesystem path into a `file://` origin, resolving it against the
/// current directory when relative
pub fn file_origin(path: &Path) -> LoaderResult<Url> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?
            .join(path)
    };
    Url::from_file_path(&absolute).map_err(|_| LoaderError::unsupported_format(absolute))
}

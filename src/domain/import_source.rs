// src/domain/import_source.rs
use crate::domain::error::{DomainError, DomainResult};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Opaque locator of externally supplied bookmark data.
///
/// Accepts any absolute URL (`file://`, `content://`, ...) or a bare
/// filesystem path, which is turned into a `file://` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportSource {
    url: Url,
}

impl ImportSource {
    pub fn parse<S: AsRef<str>>(locator: S) -> DomainResult<Self> {
        let raw = locator.as_ref().trim();
        if raw.is_empty() {
            return Err(DomainError::InvalidSource("empty locator".to_string()));
        }

        // Windows drive letters parse as a one-letter scheme
        match Url::parse(raw) {
            Ok(url) if url.scheme().len() > 1 => Ok(Self { url }),
            _ => Self::from_path(raw),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        Url::from_file_path(&absolute)
            .map(|url| Self { url })
            .map_err(|_| DomainError::InvalidSource(absolute.display().to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Filesystem path for `file` locators, `None` for anything else
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.url.scheme() == "file" {
            self.url.to_file_path().ok()
        } else {
            None
        }
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// The pending request a view was started with: a primary locator and an
/// optional attached stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportIntent {
    pub data: Option<ImportSource>,
    pub extra_stream: Option<ImportSource>,
}

impl ImportIntent {
    pub fn new(data: Option<ImportSource>, extra_stream: Option<ImportSource>) -> Self {
        Self { data, extra_stream }
    }

    pub fn with_data(source: ImportSource) -> Self {
        Self::new(Some(source), None)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The primary locator wins over the attached stream
    pub fn locator(&self) -> Option<&ImportSource> {
        self.data.as_ref().or(self.extra_stream.as_ref())
    }
}

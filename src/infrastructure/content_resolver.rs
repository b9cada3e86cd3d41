// src/infrastructure/content_resolver.rs
use crate::domain::import_source::ImportSource;
use crate::domain::repositories::content_resolver::ContentResolver;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

/// Filesystem-backed resolver.
///
/// Direct descriptors are only handed out for files inside `private_dir`,
/// the process's default access scope. Anything else needs the stream path.
#[derive(Debug, Clone)]
pub struct FsContentResolver {
    private_dir: PathBuf,
}

impl FsContentResolver {
    pub fn new<P: Into<PathBuf>>(private_dir: P) -> Self {
        Self {
            private_dir: private_dir.into(),
        }
    }

    fn file_path(source: &ImportSource) -> io::Result<PathBuf> {
        source.to_file_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported locator scheme: {}", source.scheme()),
            )
        })
    }

    fn in_private_scope(&self, path: &Path) -> bool {
        let canonical = |p: &Path| p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
        canonical(path).starts_with(canonical(&self.private_dir))
    }
}

impl ContentResolver for FsContentResolver {
    #[instrument(skip(self), level = "debug")]
    fn open_file_descriptor(&self, source: &ImportSource) -> io::Result<Option<File>> {
        let path = Self::file_path(source)?;
        if !self.in_private_scope(&path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!(
                    "{} is outside of {}",
                    path.display(),
                    self.private_dir.display()
                ),
            ));
        }
        trace!("Opening descriptor for {}", path.display());
        File::open(&path).map(Some)
    }

    #[instrument(skip(self), level = "debug")]
    fn open_input_stream(
        &self,
        source: &ImportSource,
    ) -> io::Result<Option<Box<dyn Read + Send>>> {
        let path = Self::file_path(source)?;
        match File::open(&path) {
            Ok(file) => Ok(Some(Box::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No content at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TempDir, FsContentResolver) {
        let private_dir = TempDir::new().unwrap();
        let shared_dir = TempDir::new().unwrap();
        let resolver = FsContentResolver::new(private_dir.path());
        (private_dir, shared_dir, resolver)
    }

    #[test]
    fn given_file_in_private_dir_when_open_descriptor_then_opened() {
        let (private_dir, _shared, resolver) = setup();
        let path = private_dir.path().join("bookmarks.json");
        fs::write(&path, "[]").unwrap();

        let source = ImportSource::from_path(&path).unwrap();
        let mut file = resolver.open_file_descriptor(&source).unwrap().unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "[]");
    }

    #[test]
    fn given_file_outside_private_dir_when_open_descriptor_then_permission_denied() {
        let (_private, shared_dir, resolver) = setup();
        let path = shared_dir.path().join("bookmarks.json");
        fs::write(&path, "[]").unwrap();

        let source = ImportSource::from_path(&path).unwrap();
        let err = resolver.open_file_descriptor(&source).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn given_file_outside_private_dir_when_open_stream_then_opened() {
        let (_private, shared_dir, resolver) = setup();
        let path = shared_dir.path().join("bookmarks.json");
        fs::write(&path, "[]").unwrap();

        let source = ImportSource::from_path(&path).unwrap();
        assert!(resolver.open_input_stream(&source).unwrap().is_some());
    }

    #[test]
    fn given_missing_file_when_open_stream_then_absent() {
        let (_private, shared_dir, resolver) = setup();
        let source = ImportSource::from_path(shared_dir.path().join("missing.json")).unwrap();
        assert!(resolver.open_input_stream(&source).unwrap().is_none());
    }

    #[test]
    fn given_missing_private_file_when_open_descriptor_then_io_error() {
        let (private_dir, _shared, resolver) = setup();
        let source = ImportSource::from_path(private_dir.path().join("missing.json")).unwrap();
        let err = resolver.open_file_descriptor(&source).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn given_non_file_scheme_when_open_then_unsupported() {
        let (_private, _shared, resolver) = setup();
        let source = ImportSource::parse("content://downloads/1").unwrap();
        assert!(resolver.open_file_descriptor(&source).is_err());
        assert!(resolver.open_input_stream(&source).is_err());
    }
}

// src/domain/repositories/content_resolver.rs
use crate::domain::import_source::ImportSource;
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, Read};

/// Platform primitive for opening a locator.
///
/// `Ok(None)` means the platform has no content for the locator, which is
/// not an error.
pub trait ContentResolver: Send + Sync + Debug {
    /// Low-level file handle, restricted to the default access scope
    fn open_file_descriptor(&self, source: &ImportSource) -> io::Result<Option<File>>;

    /// Generic input stream, also reaching shared external storage
    fn open_input_stream(
        &self,
        source: &ImportSource,
    ) -> io::Result<Option<Box<dyn Read + Send>>>;
}

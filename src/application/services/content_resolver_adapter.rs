// src/application/services/content_resolver_adapter.rs
use crate::domain::error::DomainResult;
use crate::domain::import_source::ImportSource;
use crate::domain::repositories::content_resolver::ContentResolver;
use crate::domain::stream::{AccessStrategy, ByteStream};
use std::io::BufReader;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Opens a locator under a chosen access strategy and hands out a buffered stream
#[derive(Debug, Clone)]
pub struct ContentResolverAdapter {
    resolver: Arc<dyn ContentResolver>,
}

impl ContentResolverAdapter {
    pub fn new(resolver: Arc<dyn ContentResolver>) -> Self {
        Self { resolver }
    }

    #[instrument(skip(self), level = "debug")]
    pub fn open(
        &self,
        source: &ImportSource,
        strategy: AccessStrategy,
    ) -> DomainResult<Option<ByteStream>> {
        let stream = match strategy {
            AccessStrategy::DirectDescriptor => self
                .resolver
                .open_file_descriptor(source)?
                .map(|file| ByteStream::new(BufReader::new(file))),
            AccessStrategy::StreamCopy => self
                .resolver
                .open_input_stream(source)?
                .map(|stream| ByteStream::new(BufReader::new(stream))),
        };

        if stream.is_none() {
            debug!("No content for {} via {}", source, strategy);
        }
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::util::testing::ScriptedContentResolver;
    use std::io::Read;

    fn source() -> ImportSource {
        ImportSource::parse("content://shared/bookmarks.json").unwrap()
    }

    #[test]
    fn given_direct_descriptor_when_open_then_only_descriptor_is_used() {
        let resolver = Arc::new(ScriptedContentResolver::new().with_descriptor_bytes(b"abc"));
        let adapter = ContentResolverAdapter::new(resolver.clone());

        let mut stream = adapter
            .open(&source(), AccessStrategy::DirectDescriptor)
            .unwrap()
            .unwrap();
        let mut content = String::new();
        stream.read_to_string(&mut content).unwrap();

        assert_eq!(content, "abc");
        assert_eq!(resolver.descriptor_calls(), 1);
        assert_eq!(resolver.stream_calls(), 0);
    }

    #[test]
    fn given_descriptor_failure_when_open_then_io_error() {
        let resolver = Arc::new(ScriptedContentResolver::new().with_descriptor_failure());
        let adapter = ContentResolverAdapter::new(resolver);

        let result = adapter.open(&source(), AccessStrategy::DirectDescriptor);
        assert!(matches!(result, Err(DomainError::Io(_))));
    }

    #[test]
    fn given_stream_without_content_when_open_then_absent_not_error() {
        let resolver = Arc::new(ScriptedContentResolver::new().with_stream_absent());
        let adapter = ContentResolverAdapter::new(resolver.clone());

        let result = adapter.open(&source(), AccessStrategy::StreamCopy).unwrap();
        assert!(result.is_none());
        assert_eq!(resolver.stream_calls(), 1);
    }
}

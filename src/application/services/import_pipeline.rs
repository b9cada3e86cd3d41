// src/application/services/import_pipeline.rs
use crate::application::services::content_resolver_adapter::ContentResolverAdapter;
use crate::domain::bookmark_data::BookmarkData;
use crate::domain::codec::BookmarkCodec;
use crate::domain::error::DomainResult;
use crate::domain::import_source::ImportSource;
use crate::domain::stream::AccessStrategy;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Resolve followed by decode, run as one blocking unit on the I/O pool
#[derive(Debug, Clone)]
pub struct ImportPipeline {
    adapter: ContentResolverAdapter,
    codec: Arc<dyn BookmarkCodec>,
}

impl ImportPipeline {
    pub fn new(adapter: ContentResolverAdapter, codec: Arc<dyn BookmarkCodec>) -> Self {
        Self { adapter, codec }
    }

    /// `Ok(None)` passes an absent resource through untouched.
    ///
    /// The stream is released before returning, on success and on decode failure.
    #[instrument(skip(self), level = "debug")]
    pub fn resolve_and_decode(
        &self,
        source: &ImportSource,
        strategy: AccessStrategy,
    ) -> DomainResult<Option<BookmarkData>> {
        let Some(mut stream) = self.adapter.open(source, strategy)? else {
            return Ok(None);
        };
        let data = self.codec.decode(&mut stream)?;
        debug!("Decoded {} from {}", data, source);
        Ok(Some(data))
    }
}

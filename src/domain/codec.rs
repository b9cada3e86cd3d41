// src/domain/codec.rs
use crate::domain::bookmark_data::BookmarkData;
use crate::domain::error::DomainResult;
use std::fmt::Debug;
use std::io::BufRead;

/// Turns a byte stream into structured bookmark data.
///
/// Runs off the presenter's context; any error is a decode failure.
pub trait BookmarkCodec: Send + Sync + Debug {
    fn decode(&self, reader: &mut dyn BufRead) -> DomainResult<BookmarkData>;
}

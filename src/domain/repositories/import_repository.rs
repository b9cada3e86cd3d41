// src/domain/repositories/import_repository.rs
use crate::domain::bookmark_data::BookmarkData;
use crate::domain::error::DomainResult;
use std::fmt::{self, Debug};

/// Outcome of committing confirmed bookmark data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} added, {} updated", self.added, self.updated)
    }
}

/// Commits bookmark data the user has confirmed.
pub trait BookmarkImporter: Send + Sync + Debug {
    fn import_bookmarks(&self, data: &BookmarkData) -> DomainResult<ImportSummary>;
}

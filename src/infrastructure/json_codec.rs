// src/infrastructure/json_codec.rs

use crate::domain::bookmark_data::{BookmarkData, BookmarkRecord};
use crate::domain::codec::BookmarkCodec;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::tag::Tag;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::BufRead;
use tracing::{instrument, warn};

#[derive(Deserialize)]
struct JsonBookmark {
    url: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonBackup {
    #[serde(default)]
    bookmarks: Vec<JsonBookmark>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    /// bkmr export: a plain array of bookmarks
    Array(Vec<JsonBookmark>),
    Backup(JsonBackup),
}

/// Decodes JSON bookmark backups
#[derive(Debug, Default)]
pub struct JsonBookmarkCodec;

impl JsonBookmarkCodec {
    pub fn new() -> Self {
        Self
    }

    fn parse_tags(raw: &[String]) -> BTreeSet<Tag> {
        raw.iter()
            .filter_map(|tag_str| match Tag::new(tag_str) {
                Ok(tag) => Some(tag),
                Err(e) => {
                    // Log warning but continue
                    warn!("Invalid tag '{}' ignored: {}", tag_str, e);
                    None
                }
            })
            .collect()
    }

    fn to_record(bookmark: JsonBookmark) -> BookmarkRecord {
        BookmarkRecord {
            tags: Self::parse_tags(&bookmark.tags),
            url: bookmark.url,
            title: bookmark.title,
            description: bookmark.description,
            created_at: bookmark.created_at,
        }
    }
}

impl BookmarkCodec for JsonBookmarkCodec {
    #[instrument(skip_all, level = "debug")]
    fn decode(&self, reader: &mut dyn BufRead) -> DomainResult<BookmarkData> {
        let mut content = String::new();
        reader.read_to_string(&mut content).map_err(|e| {
            DomainError::Decode(format!("Failed to read bookmark content: {}", e))
        })?;

        let document: JsonDocument = serde_json::from_str(&content).map_err(|e| {
            DomainError::Decode(format!(
                "Failed to parse JSON: {}. Expected an array of bookmarks or a backup object.",
                e
            ))
        })?;

        let (bookmarks, tags) = match document {
            JsonDocument::Array(bookmarks) => (bookmarks, Vec::new()),
            JsonDocument::Backup(backup) => (backup.bookmarks, backup.tags),
        };

        Ok(BookmarkData::new(
            bookmarks.into_iter().map(Self::to_record).collect(),
            Self::parse_tags(&tags).into_iter().collect(),
        ))
    }
}

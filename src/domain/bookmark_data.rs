// src/domain/bookmark_data.rs
use crate::domain::tag::Tag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single bookmark carried by an import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl BookmarkRecord {
    pub fn new<S: Into<String>>(url: S, title: S) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: String::new(),
            tags: BTreeSet::new(),
            created_at: None,
        }
    }

    pub fn with_tags(mut self, tags: BTreeSet<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }
}

/// Parsed result of a bookmark file. Owned by the presenter until handed
/// to the view for confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkData {
    #[serde(default)]
    pub bookmarks: Vec<BookmarkRecord>,
    /// Tag catalogue, including tags not referenced by any bookmark
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl BookmarkData {
    pub fn new(bookmarks: Vec<BookmarkRecord>, tags: Vec<Tag>) -> Self {
        Self { bookmarks, tags }
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty() && self.tags.is_empty()
    }

    /// All tags referenced by the data, catalogue and bookmarks combined
    pub fn all_tags(&self) -> BTreeSet<Tag> {
        self.tags
            .iter()
            .cloned()
            .chain(self.bookmarks.iter().flat_map(|b| b.tags.iter().cloned()))
            .collect()
    }
}

impl fmt::Display for BookmarkData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bookmarks, {} tags",
            self.bookmarks.len(),
            self.all_tags().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_bookmarks_with_tags_when_all_tags_then_union_of_catalogue_and_records() {
        let data = BookmarkData::new(
            vec![
                BookmarkRecord::new("https://a.example", "A")
                    .with_tags(Tag::parse_tags("rust,news").unwrap()),
                BookmarkRecord::new("https://b.example", "B"),
            ],
            vec![Tag::new("unused").unwrap(), Tag::new("rust").unwrap()],
        );

        let tags: Vec<String> = data.all_tags().iter().map(|t| t.to_string()).collect();
        assert_eq!(tags, vec!["news", "rust", "unused"]);
        assert_eq!(data.to_string(), "2 bookmarks, 3 tags");
    }

    #[test]
    fn given_default_data_when_is_empty_then_true() {
        assert!(BookmarkData::default().is_empty());
        assert_eq!(BookmarkData::default().len(), 0);
    }
}

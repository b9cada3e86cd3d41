use super::connection::{init_pool, ConnectionPool, PooledConnection};
use super::error::{SqliteRepositoryError, SqliteResult};
use super::model::{DbBookmark, NewBookmark, NewCatalogueTag};
use super::schema::bookmarks::dsl;
use super::schema::tag_catalogue;
use crate::domain::bookmark_data::{BookmarkData, BookmarkRecord};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::repositories::import_repository::{BookmarkImporter, ImportSummary};
use crate::domain::tag::Tag;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, instrument, warn};

/// Commits confirmed bookmark data into the bookmarks database.
///
/// New URLs are inserted. Existing URLs keep their row and gain the
/// imported tags. Everything happens in one transaction.
#[derive(Clone)]
pub struct SqliteBookmarkImporter {
    pool: ConnectionPool,
}

impl fmt::Debug for SqliteBookmarkImporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteBookmarkImporter")
            .field("pool_size", &self.pool.state().connections)
            .finish()
    }
}

impl SqliteBookmarkImporter {
    pub fn from_url(database_url: &str) -> SqliteResult<Self> {
        let pool = init_pool(database_url)?;
        Ok(Self { pool })
    }

    pub fn get_connection(&self) -> SqliteResult<PooledConnection> {
        self.pool.get().map_err(SqliteRepositoryError::from)
    }

    /// Number of stored bookmarks
    pub fn count(&self) -> DomainResult<i64> {
        let mut conn = self.get_connection()?;
        let n = dsl::bookmarks
            .count()
            .get_result(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;
        Ok(n)
    }

    /// Stored tags of a URL, `None` when the URL is unknown
    pub fn tags_of(&self, url: &str) -> DomainResult<Option<BTreeSet<Tag>>> {
        let mut conn = self.get_connection()?;
        let stored = find_by_url(&mut conn, url)?;
        match stored {
            Some(row) => Ok(Some(parse_stored_tags(&row.tags))),
            None => Ok(None),
        }
    }

    pub fn catalogue(&self) -> DomainResult<Vec<String>> {
        let mut conn = self.get_connection()?;
        let names = tag_catalogue::table
            .select(tag_catalogue::name)
            .order(tag_catalogue::name.asc())
            .load::<String>(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;
        Ok(names)
    }
}

impl BookmarkImporter for SqliteBookmarkImporter {
    #[instrument(skip_all, level = "debug", fields(bookmarks = data.len()))]
    fn import_bookmarks(&self, data: &BookmarkData) -> DomainResult<ImportSummary> {
        let mut conn = self.get_connection()?;

        let summary = conn
            .transaction::<ImportSummary, SqliteRepositoryError, _>(|conn| {
                let mut summary = ImportSummary::default();
                for record in &data.bookmarks {
                    if merge_record(conn, record)? {
                        summary.updated += 1;
                    } else {
                        summary.added += 1;
                    }
                }

                for tag in data.all_tags() {
                    diesel::insert_or_ignore_into(tag_catalogue::table)
                        .values(NewCatalogueTag { name: tag.value() })
                        .execute(conn)?;
                }
                Ok(summary)
            })
            .map_err(|e| DomainError::from(e).context("Failed to import bookmarks"))?;

        debug!("Import committed: {}", summary);
        Ok(summary)
    }
}

fn find_by_url(conn: &mut SqliteConnection, url: &str) -> SqliteResult<Option<DbBookmark>> {
    let row = dsl::bookmarks
        .filter(dsl::URL.eq(url))
        .select(DbBookmark::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}

/// Returns true when the URL already existed.
fn merge_record(conn: &mut SqliteConnection, record: &BookmarkRecord) -> SqliteResult<bool> {
    match find_by_url(conn, &record.url)? {
        Some(existing) => {
            let mut tags = parse_stored_tags(&existing.tags);
            let before = tags.len();
            tags.extend(record.tags.iter().cloned());
            if tags.len() != before {
                diesel::update(dsl::bookmarks.filter(dsl::id.eq(existing.id)))
                    .set((
                        dsl::tags.eq(Tag::format_tags(&tags)),
                        dsl::last_update_ts.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)?;
            }
            Ok(true)
        }
        None => {
            let new_bookmark = NewBookmark {
                url: record.url.clone(),
                metadata: record.title.clone(),
                tags: Tag::format_tags(&record.tags),
                desc: record.description.clone(),
                flags: 0,
                created_ts: Some(
                    record
                        .created_at
                        .unwrap_or_else(Utc::now)
                        .naive_utc(),
                ),
            };
            debug!("Inserting: {}", new_bookmark);
            diesel::insert_into(dsl::bookmarks)
                .values(&new_bookmark)
                .execute(conn)?;
            Ok(false)
        }
    }
}

fn parse_stored_tags(stored: &str) -> BTreeSet<Tag> {
    match Tag::parse_tags(stored) {
        Ok(tags) => tags,
        Err(e) => {
            warn!("Ignoring malformed stored tags '{}': {}", stored, e);
            BTreeSet::new()
        }
    }
}

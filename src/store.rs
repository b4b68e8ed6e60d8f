//! Relational store for bookmarks, tags and taggings.
//!
//! [`Store`] borrows a connection for the duration of one operation. A
//! `rusqlite::Transaction` derefs to a `Connection`, so the same store code
//! runs inside a transaction when the caller opened one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::error::BookmarkResult;
use crate::models::{Bookmark, BookmarkId, SortKey, Tag, TagId, Tagging};
use crate::tag_set::TagSet;

const BOOKMARK_COLUMNS: &str = "b.id, b.title, b.url, b.creation_timestamp";

/// Bookmark ids bound per tag-string lookup, below SQLite's variable limit.
const TAG_FILL_BATCH_SIZE: usize = 500;

/// Schema for the three tables. Safe to run on every open.
const SCHEMA: &str = r#"
    -- Timestamps are Unix seconds (INTEGER)
    CREATE TABLE IF NOT EXISTS bookmark (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL,
        title TEXT NOT NULL,
        creation_timestamp INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS tag (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        label TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS tagging (
        bookmark_id INTEGER NOT NULL,
        tag_id INTEGER NOT NULL,
        PRIMARY KEY (bookmark_id, tag_id),
        FOREIGN KEY (bookmark_id) REFERENCES bookmark (id) ON DELETE CASCADE,
        FOREIGN KEY (tag_id) REFERENCES tag (id) ON DELETE CASCADE
    );

    -- Orphan checks count links per tag
    CREATE INDEX IF NOT EXISTS idx_tagging_tag_id ON tagging (tag_id);
"#;

/// Store operations over a borrowed connection.
#[derive(Clone, Copy)]
pub struct Store<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Store<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Create the tables if they do not exist yet and enable foreign keys.
    pub fn init_schema(&self) -> BookmarkResult<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ========================================================================
    // Bookmarks
    // ========================================================================

    /// Insert a bookmark stamped with the current time. Returns the new id.
    pub fn insert_bookmark(&self, title: &str, url: &str) -> BookmarkResult<BookmarkId> {
        self.conn.execute(
            r#"
            INSERT INTO bookmark (url, title, creation_timestamp)
            VALUES (?, ?, strftime('%s', 'now'))
            "#,
            params![url, title],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a bookmark with an explicit creation time. Returns the new id.
    pub fn insert_bookmark_with_timestamp(
        &self,
        title: &str,
        url: &str,
        created_at: DateTime<Utc>,
    ) -> BookmarkResult<BookmarkId> {
        self.conn.execute(
            "INSERT INTO bookmark (url, title, creation_timestamp) VALUES (?, ?, ?)",
            params![url, title, created_at.timestamp()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update title and URL. Returns false if no such bookmark.
    pub fn update_bookmark(&self, id: BookmarkId, title: &str, url: &str) -> BookmarkResult<bool> {
        let updated = self.conn.execute(
            "UPDATE bookmark SET url = ?, title = ? WHERE id = ?",
            params![url, title, id],
        )?;
        Ok(updated > 0)
    }

    /// Delete the bookmark row (links cascade). Returns false if no such bookmark.
    pub fn delete_bookmark(&self, id: BookmarkId) -> BookmarkResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM bookmark WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    pub fn bookmark_exists(&self, id: BookmarkId) -> BookmarkResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM bookmark WHERE id = ?)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Get a bookmark row without its tags
    pub fn find_bookmark(&self, id: BookmarkId) -> BookmarkResult<Option<Bookmark>> {
        let bookmark = self
            .conn
            .query_row(
                &format!("SELECT {} FROM bookmark b WHERE b.id = ?", BOOKMARK_COLUMNS),
                params![id],
                row_to_bookmark,
            )
            .optional()?;
        Ok(bookmark)
    }

    /// Get a bookmark with its tag string assembled from the link table
    pub fn find_bookmark_with_tags(&self, id: BookmarkId) -> BookmarkResult<Option<Bookmark>> {
        let Some(mut bookmark) = self.find_bookmark(id)? else {
            return Ok(None);
        };
        let labels: TagSet = self
            .find_links_by_bookmark(id)?
            .into_iter()
            .map(|tag| tag.label)
            .collect();
        bookmark.tags = tag_string(&labels);
        Ok(Some(bookmark))
    }

    pub fn list_bookmarks_by_title(&self) -> BookmarkResult<Vec<Bookmark>> {
        self.list_bookmarks(None, SortKey::Title)
    }

    pub fn list_bookmarks_by_creation_time(&self) -> BookmarkResult<Vec<Bookmark>> {
        self.list_bookmarks(None, SortKey::CreationTime)
    }

    /// Bookmarks linked to at least one tag whose label is in `labels`.
    ///
    /// Each bookmark appears once no matter how many of the labels it carries.
    /// An empty label set matches nothing.
    pub fn list_bookmarks_by_tag_labels(
        &self,
        labels: &TagSet,
        sort: SortKey,
    ) -> BookmarkResult<Vec<Bookmark>> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }
        self.list_bookmarks(Some(labels), sort)
    }

    fn list_bookmarks(
        &self,
        labels: Option<&TagSet>,
        sort: SortKey,
    ) -> BookmarkResult<Vec<Bookmark>> {
        let order_by = match sort {
            SortKey::Title => "b.title, b.id",
            SortKey::CreationTime => "b.creation_timestamp, b.id",
        };

        let mut bookmarks = match labels {
            None => {
                let query = format!(
                    "SELECT {} FROM bookmark b ORDER BY {}",
                    BOOKMARK_COLUMNS, order_by
                );
                let mut stmt = self.conn.prepare(&query)?;
                let rows = stmt
                    .query_map([], row_to_bookmark)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            Some(labels) => {
                let placeholders = vec!["?"; labels.len()].join(",");
                let query = format!(
                    r#"
                    SELECT {}
                    FROM bookmark b
                    WHERE b.id IN (
                        SELECT g.bookmark_id
                        FROM tagging g
                        INNER JOIN tag t ON t.id = g.tag_id
                        WHERE t.label IN ({})
                    )
                    ORDER BY {}
                    "#,
                    BOOKMARK_COLUMNS, placeholders, order_by
                );
                let mut stmt = self.conn.prepare(&query)?;
                let rows = stmt
                    .query_map(params_from_iter(labels.iter()), row_to_bookmark)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        self.fill_tag_strings(&mut bookmarks)?;
        Ok(bookmarks)
    }

    /// Set each bookmark's tag string from the links of the listed bookmarks.
    fn fill_tag_strings(&self, bookmarks: &mut [Bookmark]) -> BookmarkResult<()> {
        let mut labels: HashMap<BookmarkId, Vec<String>> = HashMap::new();

        for chunk in bookmarks.chunks(TAG_FILL_BATCH_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let query = format!(
                r#"
                SELECT g.bookmark_id, t.label
                FROM tagging g
                INNER JOIN tag t ON t.id = g.tag_id
                WHERE g.bookmark_id IN ({})
                "#,
                placeholders
            );
            let mut stmt = self.conn.prepare(&query)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter().map(|b| b.id)), |row| {
                Ok((row.get::<_, BookmarkId>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (bookmark_id, label) = row?;
                labels.entry(bookmark_id).or_default().push(label);
            }
        }

        for bookmark in bookmarks.iter_mut() {
            bookmark.tags = labels
                .remove(&bookmark.id)
                .and_then(|l| tag_string(&l.into_iter().collect::<TagSet>()));
        }
        Ok(())
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Exact, case-sensitive label lookup
    pub fn find_tag_by_label(&self, label: &str) -> BookmarkResult<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, label FROM tag WHERE label = ?",
                params![label],
                row_to_tag,
            )
            .optional()?;
        Ok(tag)
    }

    pub fn insert_tag(&self, label: &str) -> BookmarkResult<TagId> {
        self.conn
            .execute("INSERT INTO tag (label) VALUES (?)", params![label])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_tag(&self, id: TagId) -> BookmarkResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM tag WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    pub fn list_tags_ordered_by_label(&self) -> BookmarkResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, label FROM tag ORDER BY label")?;
        let tags = stmt
            .query_map([], row_to_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    // ========================================================================
    // Taggings
    // ========================================================================

    /// Tags currently linked to a bookmark, ordered by label
    pub fn find_links_by_bookmark(&self, bookmark_id: BookmarkId) -> BookmarkResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.id, t.label
            FROM tag t
            INNER JOIN tagging g ON t.id = g.tag_id
            WHERE g.bookmark_id = ?
            ORDER BY t.label
            "#,
        )?;
        let tags = stmt
            .query_map(params![bookmark_id], row_to_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    pub fn insert_link(&self, bookmark_id: BookmarkId, tag_id: TagId) -> BookmarkResult<Tagging> {
        self.conn.execute(
            "INSERT INTO tagging (bookmark_id, tag_id) VALUES (?, ?)",
            params![bookmark_id, tag_id],
        )?;
        Ok(Tagging {
            bookmark_id,
            tag_id,
        })
    }

    pub fn delete_link(&self, bookmark_id: BookmarkId, tag_id: TagId) -> BookmarkResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM tagging WHERE bookmark_id = ? AND tag_id = ?",
            params![bookmark_id, tag_id],
        )?;
        Ok(deleted > 0)
    }

    pub fn count_links_by_tag(&self, tag_id: TagId) -> BookmarkResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM tagging WHERE tag_id = ?",
            params![tag_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub fn count_bookmarks(&self) -> BookmarkResult<i64> {
        self.count("SELECT COUNT(*) FROM bookmark")
    }

    pub fn count_tags(&self) -> BookmarkResult<i64> {
        self.count("SELECT COUNT(*) FROM tag")
    }

    pub fn count_links(&self) -> BookmarkResult<i64> {
        self.count("SELECT COUNT(*) FROM tagging")
    }

    fn count(&self, sql: &str) -> BookmarkResult<i64> {
        Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
    }
}

fn tag_string(labels: &TagSet) -> Option<String> {
    if labels.is_empty() {
        None
    } else {
        Some(labels.to_tag_string())
    }
}

fn row_to_bookmark(row: &Row) -> rusqlite::Result<Bookmark> {
    let created_secs: i64 = row.get(3)?;
    let created_at = DateTime::<Utc>::from_timestamp(created_secs, 0)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, created_secs))?;

    Ok(Bookmark {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        created_at,
        tags: None,
    })
}

fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        label: row.get(1)?,
    })
}

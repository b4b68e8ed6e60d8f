//! Database facade for the bookmark catalogue.
//!
//! [`Database`] owns the SQLite connection and exposes the operations HTTP
//! handlers and view renderers call. Each mutating operation runs in its own
//! transaction, so a store failure part way through leaves bookmarks, tags
//! and taggings exactly as they were.

use std::path::Path;

use rusqlite::Connection;

use crate::config::Config;
use crate::error::{BookmarkError, BookmarkResult};
use crate::models::{Bookmark, BookmarkDraft, BookmarkId, Tag};
use crate::query::{self, BookmarkQuery};
use crate::reconcile::{self, ReconcileSummary};
use crate::store::Store;
use crate::tag_set::{parse_tag_string, TagSet};
use crate::validation::{validate_for_create, validate_for_update};

/// Database wrapper for SQLite operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file
    pub fn new<P: AsRef<Path>>(db_path: P) -> BookmarkResult<Self> {
        let conn = Connection::open(db_path.as_ref())?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let db = Self { conn };
        db.init_database()?;
        tracing::info!(path = %db_path.as_ref().display(), "Opened bookmark database");
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> BookmarkResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_database()?;
        Ok(db)
    }

    /// Open the database file named by the configuration
    pub fn open(config: &Config) -> BookmarkResult<Self> {
        Self::new(config.database_file())
    }

    /// Initialize database schema
    fn init_database(&self) -> BookmarkResult<()> {
        self.store().init_schema()
    }

    /// Get the underlying connection (for advanced operations)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn store(&self) -> Store<'_> {
        Store::new(&self.conn)
    }

    /// Run `f` against a store bound to a fresh transaction.
    ///
    /// Commits when `f` succeeds; the transaction rolls back on drop otherwise.
    fn in_transaction<T>(
        &self,
        f: impl FnOnce(&Store<'_>) -> BookmarkResult<T>,
    ) -> BookmarkResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(&Store::new(&tx))?;
        tx.commit()?;
        Ok(value)
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Make the bookmark's linked labels equal `labels`, in one transaction.
    pub fn reconcile_tags(
        &self,
        bookmark_id: BookmarkId,
        labels: &TagSet,
    ) -> BookmarkResult<ReconcileSummary> {
        self.in_transaction(|store| reconcile::reconcile_tags(store, bookmark_id, labels))
    }

    /// Unlink every tag from the bookmark, collecting orphans, in one transaction.
    pub fn remove_all_tags(&self, bookmark_id: BookmarkId) -> BookmarkResult<ReconcileSummary> {
        self.in_transaction(|store| reconcile::remove_all_tags(store, bookmark_id))
    }

    /// All tags, ordered by label
    pub fn list_tags(&self) -> BookmarkResult<Vec<Tag>> {
        self.store().list_tags_ordered_by_label()
    }

    // ========================================================================
    // Bookmarks
    // ========================================================================

    /// List bookmarks, optionally filtered by tag labels
    pub fn list_bookmarks(&self, query: &BookmarkQuery) -> BookmarkResult<Vec<Bookmark>> {
        query::list_bookmarks(&self.store(), query)
    }

    /// Get a bookmark with its comma-joined tag labels, or None if absent
    pub fn get_bookmark_with_tags(&self, id: BookmarkId) -> BookmarkResult<Option<Bookmark>> {
        self.store().find_bookmark_with_tags(id)
    }

    /// Validate and insert a bookmark, then link its tags.
    ///
    /// Returns the stored bookmark with its normalized tag string.
    pub fn create_bookmark(&self, draft: &BookmarkDraft) -> BookmarkResult<Bookmark> {
        validate_for_create(draft)?;
        let labels = parse_tag_string(draft.tags.as_deref());

        let bookmark = self.in_transaction(|store| {
            let id = store.insert_bookmark(&draft.title, &draft.url)?;
            reconcile::reconcile_tags(store, id, &labels)?;
            store.find_bookmark_with_tags(id)?.ok_or_else(|| {
                BookmarkError::integrity(format!("bookmark {} vanished after insert", id))
            })
        })?;

        tracing::debug!(bookmark_id = bookmark.id, "Created bookmark");
        Ok(bookmark)
    }

    /// Validate and update title, URL and tags of an existing bookmark.
    ///
    /// Returns None if no bookmark has this id; nothing is written then.
    pub fn update_bookmark(
        &self,
        id: BookmarkId,
        draft: &BookmarkDraft,
    ) -> BookmarkResult<Option<Bookmark>> {
        validate_for_update(draft)?;
        let labels = parse_tag_string(draft.tags.as_deref());

        self.in_transaction(|store| {
            if !store.update_bookmark(id, &draft.title, &draft.url)? {
                return Ok(None);
            }
            let summary = reconcile::reconcile_tags(store, id, &labels)?;
            tracing::debug!(bookmark_id = id, ?summary, "Updated bookmark");
            store.find_bookmark_with_tags(id)
        })
    }

    /// Delete a bookmark and its links, collecting tags left without links.
    ///
    /// Returns false if no bookmark has this id.
    pub fn delete_bookmark(&self, id: BookmarkId) -> BookmarkResult<bool> {
        self.in_transaction(|store| {
            if !store.bookmark_exists(id)? {
                return Ok(false);
            }
            let summary = reconcile::remove_all_tags(store, id)?;
            store.delete_bookmark(id)?;
            tracing::debug!(bookmark_id = id, ?summary, "Deleted bookmark");
            Ok(true)
        })
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub fn count_bookmarks(&self) -> BookmarkResult<i64> {
        self.store().count_bookmarks()
    }

    pub fn count_tags(&self) -> BookmarkResult<i64> {
        self.store().count_tags()
    }

    pub fn count_links(&self) -> BookmarkResult<i64> {
        self.store().count_links()
    }

    /// Close the database connection
    pub fn close(self) -> BookmarkResult<()> {
        self.conn.close().map_err(|(_, e)| BookmarkError::Database(e))
    }
}

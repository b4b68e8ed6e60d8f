//! Bookmark listing.
//!
//! Resolves a listing request (optional tag filter, sort order) into an
//! ordered list of bookmarks. Every call runs a fresh query.

use serde::{Deserialize, Serialize};

use crate::error::BookmarkResult;
use crate::models::{Bookmark, SortKey};
use crate::store::Store;
use crate::tag_set::{parse_tag_string, TagSet};

/// A bookmark listing request.
///
/// A non-empty `tags` filter matches bookmarks carrying *any* of the labels
/// (union, not intersection).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkQuery {
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default)]
    pub sort: SortKey,
}

impl BookmarkQuery {
    /// All bookmarks, title order
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a query from the raw `tags` and `order` listing parameters.
    pub fn from_params(tags: Option<&str>, order: Option<&str>) -> Self {
        Self::from_params_with_default(tags, order, SortKey::Title)
    }

    /// Like [`BookmarkQuery::from_params`], falling back to `default_sort`
    /// (usually [`Config::default_sort`]) when `order` selects nothing.
    ///
    /// [`Config::default_sort`]: crate::config::Config::default_sort
    pub fn from_params_with_default(
        tags: Option<&str>,
        order: Option<&str>,
        default_sort: SortKey,
    ) -> Self {
        Self {
            tags: parse_tag_string(tags),
            sort: SortKey::from_param_or(order, default_sort),
        }
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// Run a listing query.
pub fn list_bookmarks(store: &Store<'_>, query: &BookmarkQuery) -> BookmarkResult<Vec<Bookmark>> {
    tracing::debug!(
        tags = %query.tags.to_tag_string(),
        sort = query.sort.as_param(),
        "Listing bookmarks"
    );

    if query.tags.is_empty() {
        match query.sort {
            SortKey::Title => store.list_bookmarks_by_title(),
            SortKey::CreationTime => store.list_bookmarks_by_creation_time(),
        }
    } else {
        store.list_bookmarks_by_tag_labels(&query.tags, query.sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookmarkId;
    use crate::reconcile::reconcile_tags;
    use chrono::{Duration, TimeZone, Utc};
    use rusqlite::Connection;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        Store::new(&conn).init_schema().unwrap();
        conn
    }

    fn ids(bookmarks: &[Bookmark]) -> Vec<BookmarkId> {
        bookmarks.iter().map(|b| b.id).collect()
    }

    fn add(store: &Store<'_>, title: &str, minutes: i64, tags: &str) -> BookmarkId {
        let at = Utc.with_ymd_and_hms(2015, 7, 25, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        let url = format!("https://{}.example.com", title.to_lowercase());
        let id = store.insert_bookmark_with_timestamp(title, &url, at).unwrap();
        reconcile_tags(store, id, &parse_tag_string(Some(tags))).unwrap();
        id
    }

    #[test]
    fn test_from_params() {
        let query = BookmarkQuery::from_params(Some("Tag1, ,Tag2"), Some("creation_timestamp"));
        assert_eq!(query.tags, parse_tag_string(Some("Tag1,Tag2")));
        assert_eq!(query.sort, SortKey::CreationTime);

        let query = BookmarkQuery::from_params(None, None);
        assert_eq!(query, BookmarkQuery::all());
    }

    #[test]
    fn test_from_params_with_default_sort() {
        let query = BookmarkQuery::from_params_with_default(None, None, SortKey::CreationTime);
        assert_eq!(query.sort, SortKey::CreationTime);

        let query =
            BookmarkQuery::from_params_with_default(None, Some("title"), SortKey::CreationTime);
        assert_eq!(query.sort, SortKey::Title);

        let query = BookmarkQuery::from_params_with_default(
            Some("a"),
            Some("bogus"),
            SortKey::CreationTime,
        );
        assert_eq!(query.sort, SortKey::CreationTime);
        assert!(query.tags.contains("a"));
    }

    #[test]
    fn test_filter_is_union_without_duplicates() {
        let conn = open();
        let store = Store::new(&conn);
        let first = add(&store, "First", 0, "Tag1");
        let _second = add(&store, "Second", 1, "Tag2");
        let third = add(&store, "Third", 2, "Tag1, Tag2");

        let query = BookmarkQuery::from_params(Some("Tag1"), None);
        assert_eq!(ids(&list_bookmarks(&store, &query).unwrap()), vec![first, third]);

        let query = BookmarkQuery::from_params(Some("Tag1, Tag2"), None);
        let result = list_bookmarks(&store, &query).unwrap();
        assert_eq!(result.len(), 3);
        let unique: std::collections::HashSet<BookmarkId> = ids(&result).into_iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_filter_with_unknown_label() {
        let conn = open();
        let store = Store::new(&conn);
        let first = add(&store, "First", 0, "Tag1");

        let query = BookmarkQuery::from_params(Some("nope"), None);
        assert!(list_bookmarks(&store, &query).unwrap().is_empty());

        let query = BookmarkQuery::from_params(Some("nope, Tag1"), None);
        assert_eq!(ids(&list_bookmarks(&store, &query).unwrap()), vec![first]);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let conn = open();
        let store = Store::new(&conn);
        add(&store, "First", 0, "Rust");

        let query = BookmarkQuery::from_params(Some("rust"), None);
        assert!(list_bookmarks(&store, &query).unwrap().is_empty());
    }

    #[test]
    fn test_title_and_creation_orders_mirror() {
        let conn = open();
        let store = Store::new(&conn);
        // Inserted in reverse alphabetical order
        let c = add(&store, "Charlie", 0, "");
        let b = add(&store, "Bravo", 1, "");
        let a = add(&store, "Alpha", 2, "");

        let by_title = list_bookmarks(&store, &BookmarkQuery::all()).unwrap();
        assert_eq!(ids(&by_title), vec![a, b, c]);

        let query = BookmarkQuery::all().sorted_by(SortKey::CreationTime);
        let by_time = list_bookmarks(&store, &query).unwrap();
        assert_eq!(ids(&by_time), vec![c, b, a]);

        let mut reversed = ids(&by_time);
        reversed.reverse();
        assert_eq!(ids(&by_title), reversed);
    }

    #[test]
    fn test_filtered_listing_respects_sort() {
        let conn = open();
        let store = Store::new(&conn);
        let zulu = add(&store, "Zulu", 0, "x");
        let _other = add(&store, "Mike", 1, "y");
        let alpha = add(&store, "Alpha", 2, "x");

        let tags = parse_tag_string(Some("x"));
        let query = BookmarkQuery::all().with_tags(tags.clone());
        assert_eq!(ids(&list_bookmarks(&store, &query).unwrap()), vec![alpha, zulu]);

        let query = BookmarkQuery::all()
            .with_tags(tags)
            .sorted_by(SortKey::CreationTime);
        assert_eq!(ids(&list_bookmarks(&store, &query).unwrap()), vec![zulu, alpha]);
    }

    #[test]
    fn test_listing_includes_tag_strings() {
        let conn = open();
        let store = Store::new(&conn);
        add(&store, "Tagged", 0, "web, api");
        add(&store, "Plain", 1, "");

        let result = list_bookmarks(&store, &BookmarkQuery::all()).unwrap();
        assert_eq!(result[0].title, "Plain");
        assert_eq!(result[0].tags, None);
        assert_eq!(result[1].tags.as_deref(), Some("api, web"));
    }

    #[test]
    fn test_query_is_restartable() {
        let conn = open();
        let store = Store::new(&conn);
        add(&store, "One", 0, "t");
        let query = BookmarkQuery::from_params(Some("t"), None);

        let first = list_bookmarks(&store, &query).unwrap();
        let second = list_bookmarks(&store, &query).unwrap();
        assert_eq!(first, second);

        let two = add(&store, "Two", 1, "t");
        let third = list_bookmarks(&store, &query).unwrap();
        assert_eq!(third.len(), 2);
        assert_eq!(third[1].id, two);
    }
}

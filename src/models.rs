//! Data models for the bookmark catalogue.
//!
//! This module defines the core entities: Bookmark, Tag, and Tagging.
//! Identities are SQLite integer row ids assigned by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned bookmark identity
pub type BookmarkId = i64;

/// Store-assigned tag identity
pub type TagId = i64;

/// A bookmark as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Row id (immutable once assigned)
    pub id: BookmarkId,
    pub title: String,
    pub url: String,
    /// Set by the store at insert, never updated
    pub created_at: DateTime<Utc>,
    /// Comma-joined labels of the currently linked tags (None if untagged).
    /// Assembled from the link table on read; never stored on the bookmark row.
    pub tags: Option<String>,
}

impl Bookmark {
    /// Check if the bookmark has any linked tags
    pub fn is_tagged(&self) -> bool {
        self.tags.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A tag. Labels are unique across the whole store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
}

/// Association between a bookmark and a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tagging {
    pub bookmark_id: BookmarkId,
    pub tag_id: TagId,
}

/// Client payload for creating or updating a bookmark.
///
/// `tags` is the raw free-text tag string exactly as the client sent it;
/// it is parsed into a [`crate::TagSet`] before reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkDraft {
    #[serde(default)]
    pub id: Option<BookmarkId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tags: Option<String>,
}

impl BookmarkDraft {
    pub fn new(title: impl Into<String>, url: impl Into<String>, tags: Option<&str>) -> Self {
        Self {
            id: None,
            title: title.into(),
            url: url.into(),
            tags: tags.map(String::from),
        }
    }
}

/// Ordering of a bookmark listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Lexicographic ascending by title
    #[default]
    Title,
    /// Chronological ascending by creation time
    #[serde(rename = "creation_timestamp")]
    CreationTime,
}

impl SortKey {
    /// Interpret the `order` listing parameter.
    ///
    /// Only `"creation_timestamp"` selects creation-time ordering; anything
    /// else, including an absent parameter, falls back to title ordering.
    pub fn from_param(order: Option<&str>) -> Self {
        Self::from_param_or(order, SortKey::Title)
    }

    /// Like [`SortKey::from_param`], with `default` used when the parameter
    /// is absent or names no known ordering.
    pub fn from_param_or(order: Option<&str>, default: SortKey) -> Self {
        match order {
            Some("title") => SortKey::Title,
            Some("creation_timestamp") => SortKey::CreationTime,
            _ => default,
        }
    }

    /// The parameter value that selects this ordering
    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::CreationTime => "creation_timestamp",
        }
    }
}

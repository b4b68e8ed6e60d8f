//! BookmarkCore - the tag subsystem of a bookmark catalogue.
//!
//! This library provides:
//! - Data models (Bookmark, Tag, Tagging)
//! - Tag string parsing into normalized label sets
//! - Tag reconciliation with orphan-tag collection
//! - Tag-filtered, sorted bookmark listings
//! - Database operations (SQLite)
//! - Configuration management
//!
//! Routing, form parsing, templating and JSON encoding live in the embedding
//! application, which calls into [`Database`] with already-parsed values.
//!
//! # Feature Flags
//!
//! - `desktop`: Default config directory detection.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod query;
pub mod reconcile;
pub mod store;
pub mod tag_set;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use database::Database;
pub use error::{BookmarkError, BookmarkResult};
pub use models::{Bookmark, BookmarkDraft, BookmarkId, SortKey, Tag, TagId, Tagging};
pub use query::BookmarkQuery;
pub use reconcile::ReconcileSummary;
pub use tag_set::{parse_tag_string, TagSet};

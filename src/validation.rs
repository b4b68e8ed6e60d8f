//! Input validation for bookmarks.
//!
//! Validation runs before any store write: a draft that fails here never
//! reaches tag reconciliation. All validators return
//! `BookmarkError::Validation` on failure.

use url::Url;

use crate::error::{BookmarkError, BookmarkResult};
use crate::models::BookmarkDraft;

// Column widths of the bookmark table
pub const MAX_TITLE_LENGTH: usize = 80;
pub const MAX_URL_LENGTH: usize = 2048;

/// Validate a bookmark title.
///
/// Titles must be non-empty after stripping whitespace and no longer than
/// MAX_TITLE_LENGTH characters.
pub fn validate_title(title: &str) -> BookmarkResult<()> {
    if title.trim().is_empty() {
        return Err(BookmarkError::validation("title", "can't be empty"));
    }

    let length = title.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(BookmarkError::validation(
            "title",
            format!(
                "cannot exceed {} characters (got {})",
                MAX_TITLE_LENGTH, length
            ),
        ));
    }

    Ok(())
}

/// Validate a bookmark URL.
///
/// URLs must be non-empty, no longer than MAX_URL_LENGTH characters, and
/// parse as an absolute URL.
pub fn validate_url(url: &str) -> BookmarkResult<()> {
    if url.trim().is_empty() {
        return Err(BookmarkError::validation("url", "can't be empty"));
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(BookmarkError::validation(
            "url",
            format!(
                "cannot exceed {} characters (got {})",
                MAX_URL_LENGTH,
                url.len()
            ),
        ));
    }

    Url::parse(url)
        .map_err(|e| BookmarkError::validation("url", format!("is not valid: {}", e)))?;

    Ok(())
}

/// Validate a draft used to update an existing bookmark.
pub fn validate_for_update(draft: &BookmarkDraft) -> BookmarkResult<()> {
    validate_title(&draft.title)?;
    validate_url(&draft.url)
}

/// Validate a draft used to create a bookmark.
///
/// Identities are assigned by the store, so a draft carrying an id is rejected.
pub fn validate_for_create(draft: &BookmarkDraft) -> BookmarkResult<()> {
    if draft.id.is_some() {
        return Err(BookmarkError::validation("id", "must be null"));
    }
    validate_for_update(draft)
}

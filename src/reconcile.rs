//! Tag reconciliation.
//!
//! A bookmark's links are a derived view of the label set the client last
//! supplied. Reconciling computes the difference between the currently linked
//! tags and the desired labels, applies it, and deletes any tag left with no
//! links.
//!
//! These functions issue several statements against the store. Callers that
//! need all-or-nothing behaviour run them on a transaction (see
//! [`crate::Database::reconcile_tags`]).

use serde::{Deserialize, Serialize};

use crate::error::{BookmarkError, BookmarkResult};
use crate::models::{BookmarkId, Tag};
use crate::store::Store;
use crate::tag_set::TagSet;

/// What a reconciliation changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    /// Links inserted for this bookmark
    pub links_added: usize,
    /// Links deleted from this bookmark
    pub links_removed: usize,
    /// Tag rows created because no tag had the label yet
    pub tags_created: usize,
    /// Tag rows deleted because their last link was removed
    pub tags_collected: usize,
}

impl ReconcileSummary {
    /// True when the bookmark's links were already as desired
    pub fn is_noop(&self) -> bool {
        self.links_added == 0 && self.links_removed == 0
    }
}

/// Make the bookmark's linked labels equal `desired`.
///
/// Fails with [`BookmarkError::Integrity`] if the bookmark does not exist, so
/// no link is ever created for a missing bookmark.
pub fn reconcile_tags(
    store: &Store<'_>,
    bookmark_id: BookmarkId,
    desired: &TagSet,
) -> BookmarkResult<ReconcileSummary> {
    ensure_bookmark(store, bookmark_id)?;

    let current = store.find_links_by_bookmark(bookmark_id)?;
    let (kept, to_remove): (Vec<Tag>, Vec<Tag>) = current
        .into_iter()
        .partition(|tag| desired.contains(&tag.label));
    let kept: TagSet = kept.into_iter().map(|tag| tag.label).collect();

    tracing::debug!(
        bookmark_id,
        keep = kept.len(),
        remove = to_remove.len(),
        desired = desired.len(),
        "Reconciling bookmark tags"
    );

    let mut summary = ReconcileSummary::default();
    unlink_tags(store, bookmark_id, &to_remove, &mut summary)?;

    for label in desired.difference(&kept) {
        let tag_id = match store.find_tag_by_label(label)? {
            Some(tag) => tag.id,
            None => {
                summary.tags_created += 1;
                store.insert_tag(label)?
            }
        };
        store.insert_link(bookmark_id, tag_id)?;
        summary.links_added += 1;
    }

    Ok(summary)
}

/// Unlink every tag from the bookmark, collecting tags that become orphans.
///
/// Used before deleting a bookmark.
pub fn remove_all_tags(
    store: &Store<'_>,
    bookmark_id: BookmarkId,
) -> BookmarkResult<ReconcileSummary> {
    ensure_bookmark(store, bookmark_id)?;

    let current = store.find_links_by_bookmark(bookmark_id)?;
    let mut summary = ReconcileSummary::default();
    unlink_tags(store, bookmark_id, &current, &mut summary)?;
    Ok(summary)
}

fn ensure_bookmark(store: &Store<'_>, bookmark_id: BookmarkId) -> BookmarkResult<()> {
    if store.bookmark_exists(bookmark_id)? {
        Ok(())
    } else {
        Err(BookmarkError::integrity(format!(
            "bookmark {} does not exist",
            bookmark_id
        )))
    }
}

/// Delete each link, then delete the tag if that was its last link.
///
/// The orphan check must follow the link delete, otherwise the link being
/// removed would still be counted.
fn unlink_tags(
    store: &Store<'_>,
    bookmark_id: BookmarkId,
    tags: &[Tag],
    summary: &mut ReconcileSummary,
) -> BookmarkResult<()> {
    for tag in tags {
        if store.delete_link(bookmark_id, tag.id)? {
            summary.links_removed += 1;
        }
        if store.count_links_by_tag(tag.id)? < 1 {
            store.delete_tag(tag.id)?;
            summary.tags_collected += 1;
            tracing::info!(tag_id = tag.id, label = %tag.label, "Collected orphan tag");
        }
    }
    Ok(())
}

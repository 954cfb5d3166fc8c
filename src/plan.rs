//! Sync planning: deciding what a run has to fetch.
//!
//! The planner compares the freshly fetched index total against the
//! stored checkpoint for the same book and emits a [`SyncPlan`]: either
//! nothing new (reuse the prior document) or a delta starting at the
//! first unseen chapter. A checkpoint whose content file has vanished is
//! treated as if no checkpoint existed, forcing a full refetch instead
//! of failing.

use crate::checkpoint::Checkpoint;

/// What a book sync has to do this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPlan {
    /// No new chapters; reuse the prior content file unchanged.
    UpToDate,

    /// Fetch chapters `[start, total)` in source order.
    Fetch {
        /// Index of the first chapter to fetch (== prior chapter count)
        start: usize,

        /// Whether the document starts from scratch (header block
        /// written) instead of appending to prior content
        fresh: bool,
    },
}

/// Computes the plan for one book.
///
/// `prior_file_exists` reports whether the checkpoint's `content_file`
/// is still present; callers check the filesystem, keeping this function
/// pure and directly testable.
///
/// # Examples
///
/// ```rust
/// use novelsync::plan::{SyncPlan, plan_sync};
///
/// // First run: everything is new.
/// assert_eq!(
///     plan_sync(3, None, false),
///     SyncPlan::Fetch { start: 0, fresh: true }
/// );
/// ```
pub fn plan_sync(
    total_chapters: usize,
    checkpoint: Option<&Checkpoint>,
    prior_file_exists: bool,
) -> SyncPlan {
    let prior_count = match checkpoint {
        Some(cp) if prior_file_exists => cp.chapter_count,
        // Missing content file invalidates the recorded progress.
        _ => 0,
    };

    if prior_count > 0 && total_chapters <= prior_count {
        return SyncPlan::UpToDate;
    }

    SyncPlan::Fetch {
        start: prior_count.min(total_chapters),
        fresh: prior_count == 0,
    }
}

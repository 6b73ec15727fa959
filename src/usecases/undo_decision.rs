//! Use case: undo the last classification decision.

use crate::models::{ClassificationSession, Decision};
use crate::services::SyncWorker;
use crate::storage::ProgressStore;

/// Pop the last decision, queue the inverse playlist mutation for each of
/// its themes, and persist. Returns `None` on an empty history, leaving
/// everything untouched.
pub fn undo(
    session: &mut ClassificationSession,
    sync: &SyncWorker,
    progress: &ProgressStore,
) -> Option<Decision> {
    let last = session.undo_last()?;

    if !last.skipped {
        for theme_key in &last.themes {
            sync.remove(theme_key, &last.track_id);
        }
    }

    if let Err(e) = progress.save(session) {
        log::error!("[Undo] Failed to save progress: {}", e);
    }
    Some(last)
}

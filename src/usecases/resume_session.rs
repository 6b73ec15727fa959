//! Use case: resume a persisted session or start a fresh one.

use crate::models::{ClassificationSession, Track};
use crate::storage::ProgressStore;

/// Load the persisted session if one exists, otherwise start fresh over
/// the fetched tracks. A resumed session whose snapshot no longer matches
/// the fetch (new likes, removed likes) is reconciled by track id so the
/// cursor always points at a real track.
pub fn resume_or_start(tracks: &[Track], progress: &ProgressStore) -> ClassificationSession {
    let Some(mut session) = progress.load() else {
        log::info!("[Session] Starting fresh session over {} tracks", tracks.len());
        return ClassificationSession::new(tracks);
    };

    let fresh_ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    let snapshot: Vec<&str> = session.track_ids.iter().map(String::as_str).collect();
    if snapshot != fresh_ids {
        log::info!(
            "[Session] Liked songs changed since last run ({} -> {} tracks), reconciling",
            session.track_ids.len(),
            tracks.len()
        );
        session.reconcile(tracks);
    }

    log::info!(
        "[Session] Resuming at {}/{}",
        session.current_index,
        session.track_ids.len()
    );
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Decision;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: "Song".to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            popularity: None,
            duration_ms: 60_000,
            release_date: String::new(),
            explicit: false,
            album_image_url: None,
            preview_url: None,
        }
    }

    #[test]
    fn test_starts_fresh_without_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let progress = ProgressStore::new(dir.path().join("progress.json"));
        let tracks = vec![track("a"), track("b")];

        let session = resume_or_start(&tracks, &progress);
        assert_eq!(session.current_index, 0);
        assert_eq!(session.track_ids, vec!["a", "b"]);
        assert!(session.decisions.is_empty());
    }

    #[test]
    fn test_resumes_persisted_session_verbatim_when_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let progress = ProgressStore::new(dir.path().join("progress.json"));
        let tracks = vec![track("a"), track("b")];

        let mut original = ClassificationSession::new(&tracks);
        original.add_decision(Decision {
            track_id: "a".to_string(),
            track_name: "Song".to_string(),
            artist: "Artist".to_string(),
            themes: vec!["ambiance".to_string()],
            skipped: false,
        });
        progress.save(&original).unwrap();

        let resumed = resume_or_start(&tracks, &progress);
        assert_eq!(resumed, original);
    }

    #[test]
    fn test_resume_reconciles_changed_track_list() {
        let dir = tempfile::tempdir().unwrap();
        let progress = ProgressStore::new(dir.path().join("progress.json"));

        let old_tracks = vec![track("a"), track("b"), track("c")];
        let mut original = ClassificationSession::new(&old_tracks);
        original.add_decision(Decision {
            track_id: "a".to_string(),
            track_name: "Song".to_string(),
            artist: "Artist".to_string(),
            themes: vec!["ambiance".to_string()],
            skipped: false,
        });
        progress.save(&original).unwrap();

        // "b" unliked, "z" newly liked at the top
        let fresh = vec![track("z"), track("a"), track("c")];
        let resumed = resume_or_start(&fresh, &progress);

        assert_eq!(resumed.track_ids, vec!["a", "z", "c"]);
        assert_eq!(resumed.current_index, 1);
        assert_eq!(resumed.decisions, original.decisions);
        assert_eq!(resumed.current_track_id(), Some("z"));
    }
}

//! Use case: classify the current track into a theme, or skip it.

use crate::models::{ClassificationSession, Decision, Track};
use crate::services::SyncWorker;
use crate::storage::ProgressStore;

/// Record a theme for the track under the cursor, queue the playlist add,
/// and persist. Deciding the same track again before advancing adds the
/// theme to the existing decision; a repeated identical key is ignored.
pub fn decide(
    session: &mut ClassificationSession,
    track: &Track,
    theme_key: &str,
    sync: &SyncWorker,
    progress: &ProgressStore,
) -> Decision {
    let decision = match session.decision_for_mut(&track.id) {
        Some(existing) => {
            if !existing.themes.iter().any(|t| t == theme_key) {
                existing.themes.push(theme_key.to_string());
            }
            existing.clone()
        }
        None => {
            let decision = Decision {
                track_id: track.id.clone(),
                track_name: track.name.clone(),
                artist: track.artist.clone(),
                themes: vec![theme_key.to_string()],
                skipped: false,
            };
            session.add_decision(decision.clone());
            decision
        }
    };

    sync.add(theme_key, &track.id);

    if let Err(e) = progress.save(session) {
        log::error!("[Classify] Failed to save progress: {}", e);
    }
    decision
}

/// Skip the track under the cursor. No playlist side effect.
pub fn skip(
    session: &mut ClassificationSession,
    track: &Track,
    progress: &ProgressStore,
) -> Decision {
    let decision = Decision {
        track_id: track.id.clone(),
        track_name: track.name.clone(),
        artist: track.artist.clone(),
        themes: Vec::new(),
        skipped: true,
    };
    session.add_decision(decision.clone());

    if let Err(e) = progress.save(session) {
        log::error!("[Classify] Failed to save progress: {}", e);
    }
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::playlist_sync::{DryRunSync, PlaylistSync};
    use crate::services::{SyncAction, SyncOutcome};
    use crate::storage::export::export_csv;
    use crate::usecases::undo_decision;
    use std::sync::mpsc::Receiver;
    use std::time::Duration;

    fn track(id: &str, name: &str) -> Track {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            popularity: Some(10),
            duration_ms: 180_000,
            release_date: "2022-06-01".to_string(),
            explicit: false,
            album_image_url: None,
            preview_url: None,
        }
    }

    fn harness() -> (
        tempfile::TempDir,
        ProgressStore,
        SyncWorker,
        Receiver<SyncOutcome>,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let progress = ProgressStore::new(dir.path().join("progress.json"));
        let (worker, events) = SyncWorker::spawn(PlaylistSync::DryRun(DryRunSync::new()));
        (dir, progress, worker, events)
    }

    fn recv(events: &Receiver<SyncOutcome>) -> SyncOutcome {
        events.recv_timeout(Duration::from_secs(5)).expect("outcome")
    }

    #[test]
    fn test_decide_advances_cursor_and_queues_add() {
        let (_dir, progress, worker, events) = harness();
        let tracks = vec![track("t1", "One"), track("t2", "Two")];
        let mut session = ClassificationSession::new(&tracks);

        let decision = decide(&mut session, &tracks[0], "ambiance", &worker, &progress);
        assert_eq!(decision.themes, vec!["ambiance"]);
        assert_eq!(session.current_index, 1);
        assert!(progress.exists());

        let outcome = recv(&events);
        assert_eq!(outcome.action, SyncAction::Add);
        assert_eq!(outcome.track_id, "t1");
        assert_eq!(outcome.theme_key, "ambiance");
    }

    #[test]
    fn test_repeat_decide_same_theme_does_not_duplicate() {
        let (_dir, progress, worker, _events) = harness();
        let tracks = vec![track("t1", "One")];
        let mut session = ClassificationSession::new(&tracks);

        decide(&mut session, &tracks[0], "ambiance", &worker, &progress);
        let decision = decide(&mut session, &tracks[0], "ambiance", &worker, &progress);

        assert_eq!(decision.themes, vec!["ambiance"]);
        // a second decide on the same track does not advance again
        assert_eq!(session.current_index, 1);
        assert_eq!(session.decisions.len(), 1);
    }

    #[test]
    fn test_second_theme_lands_on_same_decision() {
        let (_dir, progress, worker, _events) = harness();
        let tracks = vec![track("t1", "One")];
        let mut session = ClassificationSession::new(&tracks);

        decide(&mut session, &tracks[0], "ambiance", &worker, &progress);
        let decision = decide(&mut session, &tracks[0], "lets_dance", &worker, &progress);

        assert_eq!(decision.themes, vec!["ambiance", "lets_dance"]);
        assert_eq!(session.decisions.len(), 1);
    }

    #[test]
    fn test_skip_has_no_playlist_side_effect() {
        let (_dir, progress, worker, events) = harness();
        let tracks = vec![track("t1", "One")];
        let mut session = ClassificationSession::new(&tracks);

        let decision = skip(&mut session, &tracks[0], &progress);
        assert!(decision.skipped);
        assert!(decision.themes.is_empty());
        assert_eq!(session.current_index, 1);

        drop(worker);
        // worker exits without ever emitting an outcome
        assert!(events.recv().is_err());
    }

    #[test]
    fn test_cursor_tracks_call_count() {
        let (_dir, progress, worker, _events) = harness();
        let tracks: Vec<Track> = (1..=5).map(|i| track(&format!("t{}", i), "Song")).collect();
        let mut session = ClassificationSession::new(&tracks);

        decide(&mut session, &tracks[0], "ambiance", &worker, &progress);
        skip(&mut session, &tracks[1], &progress);
        decide(&mut session, &tracks[2], "lets_dance", &worker, &progress);
        skip(&mut session, &tracks[3], &progress);

        assert_eq!(session.current_index, 4);
        assert_eq!(session.decisions.len(), 4);
    }

    // Full journey: classify t1, classify t2, undo, skip t2, classify t3,
    // then export. Mirrors a real session with one change of mind.
    #[test]
    fn test_classification_journey_with_undo_and_export() {
        let (dir, progress, worker, events) = harness();
        let tracks = vec![track("t1", "One"), track("t2", "Two"), track("t3", "Three")];
        let mut session = ClassificationSession::new(&tracks);

        decide(&mut session, &tracks[0], "ambiance", &worker, &progress);
        decide(&mut session, &tracks[1], "lets_dance", &worker, &progress);
        undo_decision::undo(&mut session, &worker, &progress).unwrap();
        skip(&mut session, &tracks[1], &progress);
        decide(&mut session, &tracks[2], "lets_dance", &worker, &progress);

        assert_eq!(session.current_index, 3);
        assert_eq!(session.decisions.len(), 3);
        assert_eq!(session.decisions[0].themes, vec!["ambiance"]);
        assert!(session.decisions[1].skipped);
        assert_eq!(session.decisions[2].themes, vec!["lets_dance"]);
        assert!(session.is_complete());

        // side effects: add t1, add t2, remove t2 (undo inverse), add t3
        let outcomes: Vec<SyncOutcome> = (0..4).map(|_| recv(&events)).collect();
        assert_eq!(outcomes[0].action, SyncAction::Add);
        assert_eq!(outcomes[1].action, SyncAction::Add);
        assert_eq!(outcomes[2].action, SyncAction::Remove);
        assert_eq!(outcomes[2].track_id, "t2");
        assert_eq!(outcomes[2].theme_key, "lets_dance");
        assert_eq!(outcomes[3].action, SyncAction::Add);
        assert_eq!(outcomes[3].track_id, "t3");

        let csv_path = dir.path().join("export.csv");
        export_csv(&session.decisions, &csv_path).unwrap();
        let content = std::fs::read_to_string(&csv_path).unwrap();
        let rows: Vec<&str> = content.lines().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], "t1,One,Artist,ambiance,false");
        assert_eq!(rows[2], "t2,Two,Artist,,true");
        assert_eq!(rows[3], "t3,Three,Artist,lets_dance,false");
    }
}

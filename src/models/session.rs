use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Decision, Track};

/// Lifecycle state derived from the cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Complete,
}

/// The ordered, resumable classification run over a fixed track list.
///
/// Invariant: `current_index == decisions.len()` at all times. Every
/// decide/skip appends one decision and advances the cursor by one; undo
/// pops the last decision and retreats by one. Decisions keep resolution
/// order, which is not necessarily track order once undo is involved.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClassificationSession {
    pub current_index: usize,
    pub track_ids: Vec<String>,
    pub decisions: Vec<Decision>,
}

impl ClassificationSession {
    /// Fresh session over the fetched tracks, cursor at the start.
    pub fn new(tracks: &[Track]) -> Self {
        Self {
            current_index: 0,
            track_ids: tracks.iter().map(|t| t.id.clone()).collect(),
            decisions: Vec::new(),
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> SessionState {
        if !self.track_ids.is_empty() && self.current_index >= self.track_ids.len() {
            SessionState::Complete
        } else if self.current_index == 0 {
            SessionState::NotStarted
        } else {
            SessionState::InProgress
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.track_ids.len()
    }

    #[allow(dead_code)]
    pub fn decided_count(&self) -> usize {
        self.decisions.len()
    }

    /// Track id under the cursor, if any work remains.
    pub fn current_track_id(&self) -> Option<&str> {
        self.track_ids.get(self.current_index).map(String::as_str)
    }

    #[allow(dead_code)]
    pub fn decision_for(&self, track_id: &str) -> Option<&Decision> {
        self.decisions.iter().find(|d| d.track_id == track_id)
    }

    pub fn decision_for_mut(&mut self, track_id: &str) -> Option<&mut Decision> {
        self.decisions.iter_mut().find(|d| d.track_id == track_id)
    }

    /// Append a decision and advance the cursor.
    pub fn add_decision(&mut self, decision: Decision) {
        self.decisions.push(decision);
        self.current_index += 1;
    }

    /// Pop the last decision and retreat the cursor. Returns `None` on an
    /// empty history, leaving the session untouched.
    pub fn undo_last(&mut self) -> Option<Decision> {
        if self.decisions.is_empty() || self.current_index == 0 {
            return None;
        }
        self.current_index -= 1;
        self.decisions.pop()
    }

    /// Align a resumed session with a freshly fetched track list.
    ///
    /// Decided ids keep their resolution order at the front, then every
    /// fresh undecided id follows in fetch order. Ids that were never
    /// decided and are no longer liked drop out. The cursor is pinned to
    /// `decisions.len()` so the cursor invariant survives.
    pub fn reconcile(&mut self, tracks: &[Track]) {
        let decided: HashSet<&str> = self.decisions.iter().map(|d| d.track_id.as_str()).collect();
        let mut ids: Vec<String> = self.decisions.iter().map(|d| d.track_id.clone()).collect();
        ids.extend(
            tracks
                .iter()
                .filter(|t| !decided.contains(t.id.as_str()))
                .map(|t| t.id.clone()),
        );
        self.track_ids = ids;
        self.current_index = self.decisions.len();
    }
}

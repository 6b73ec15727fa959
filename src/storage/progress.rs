//! Save, load, and clear classification progress on disk.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::models::ClassificationSession;

/// Persists the session as JSON. The file holds `current_index`, the
/// `track_ids` snapshot, and the decision list in resolution order.
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, session: &ClassificationSession) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    /// Load the persisted session. A missing, unreadable, or corrupt file
    /// yields `None` so a fresh session starts instead.
    pub fn load(&self) -> Option<ClassificationSession> {
        if !self.path.exists() {
            return None;
        }
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("[Progress] Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("[Progress] Corrupt progress file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    #[allow(dead_code)]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Decision;

    fn store() -> (tempfile::TempDir, ProgressStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        (dir, store)
    }

    fn mixed_session() -> ClassificationSession {
        let mut session = ClassificationSession {
            current_index: 0,
            track_ids: vec!["t1".to_string(), "t2".to_string(), "t3".to_string()],
            decisions: Vec::new(),
        };
        session.add_decision(Decision {
            track_id: "t1".to_string(),
            track_name: "One".to_string(),
            artist: "A".to_string(),
            themes: vec!["ambiance".to_string(), "lets_dance".to_string()],
            skipped: false,
        });
        session.add_decision(Decision {
            track_id: "t2".to_string(),
            track_name: "Two".to_string(),
            artist: "B".to_string(),
            themes: Vec::new(),
            skipped: true,
        });
        session
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let (_dir, store) = store();
        let session = mixed_session();
        store.save(&session).unwrap();

        assert!(store.exists());
        assert_eq!(store.load().unwrap(), session);
    }

    #[test]
    fn test_missing_file_loads_none() {
        let (_dir, store) = store();
        assert!(!store.exists());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_file_loads_none() {
        let (_dir, store) = store();
        fs::write(store.path.clone(), "}}garbage").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear_removes_file_and_tolerates_absence() {
        let (_dir, store) = store();
        store.save(&mixed_session()).unwrap();
        store.clear().unwrap();
        assert!(!store.exists());

        // clearing an already-missing file is fine
        store.clear().unwrap();
    }
}

//! Background worker serializing playlist mutations.
//!
//! The worker thread owns the sync backend and processes one command at a
//! time, so remote mutations happen in the order the user decided them.
//! Every command yields a SyncOutcome on the event channel; the UI polls
//! it and shows failures per track instead of letting local and remote
//! state drift apart silently.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use super::playlist_sync::PlaylistSync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Add,
    Remove,
}

#[derive(Debug)]
enum SyncCommand {
    Add { theme_key: String, track_id: String },
    Remove { theme_key: String, track_id: String },
    Shutdown,
}

/// Completion or failure signal for one playlist mutation.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub action: SyncAction,
    pub theme_key: String,
    pub track_id: String,
    pub result: Result<(), String>,
}

pub struct SyncWorker {
    tx: Sender<SyncCommand>,
    handle: Option<JoinHandle<()>>,
}

impl SyncWorker {
    /// Spawn the worker thread and hand back the outcome channel.
    pub fn spawn(mut sync: PlaylistSync) -> (Self, Receiver<SyncOutcome>) {
        let (tx, rx) = mpsc::channel::<SyncCommand>();
        let (events_tx, events_rx) = mpsc::channel::<SyncOutcome>();

        let handle = std::thread::spawn(move || {
            while let Ok(command) = rx.recv() {
                let (action, theme_key, track_id) = match command {
                    SyncCommand::Shutdown => break,
                    SyncCommand::Add {
                        theme_key,
                        track_id,
                    } => (SyncAction::Add, theme_key, track_id),
                    SyncCommand::Remove {
                        theme_key,
                        track_id,
                    } => (SyncAction::Remove, theme_key, track_id),
                };

                let result = match action {
                    SyncAction::Add => sync.add_track(&theme_key, &track_id),
                    SyncAction::Remove => sync.remove_track(&theme_key, &track_id),
                };
                if let Err(e) = &result {
                    log::error!(
                        "[Sync] {:?} of {} for {} failed: {}",
                        action,
                        track_id,
                        theme_key,
                        e
                    );
                }
                let _ = events_tx.send(SyncOutcome {
                    action,
                    theme_key,
                    track_id,
                    result: result.map_err(|e| e.to_string()),
                });
            }
            log::debug!("[Sync] Worker stopped");
        });

        (
            Self {
                tx,
                handle: Some(handle),
            },
            events_rx,
        )
    }

    pub fn add(&self, theme_key: &str, track_id: &str) {
        let _ = self.tx.send(SyncCommand::Add {
            theme_key: theme_key.to_string(),
            track_id: track_id.to_string(),
        });
    }

    pub fn remove(&self, theme_key: &str, track_id: &str) {
        let _ = self.tx.send(SyncCommand::Remove {
            theme_key: theme_key.to_string(),
            track_id: track_id.to_string(),
        });
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(SyncCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

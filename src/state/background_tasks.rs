use std::sync::mpsc::Receiver;

use crate::classifier::PreloadStatus;
use crate::models::Track;
use crate::services::SyncOutcome;
use crate::usecases::check_update::UpdateInfo;

/// Result of the startup authentication thread.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub token: String,
    pub display_name: Option<String>,
}

/// Receivers for work running off the UI thread, drained every frame.
#[derive(Default)]
pub struct BackgroundTasks {
    // Startup authentication
    pub auth_rx: Option<Receiver<Result<AuthOutcome, String>>>,

    // Liked-songs fetch
    pub tracks_rx: Option<Receiver<Result<Vec<Track>, String>>>,

    // Classifier preload progress
    pub preload_rx: Option<Receiver<PreloadStatus>>,

    // Playlist sync outcomes
    pub sync_rx: Option<Receiver<SyncOutcome>>,

    // Update check
    pub update_rx: Option<Receiver<Result<Option<UpdateInfo>, String>>>,
}

impl BackgroundTasks {
    /// Drop every receiver (logout / stop & clear).
    pub fn clear_all(&mut self) {
        self.auth_rx = None;
        self.tracks_rx = None;
        self.preload_rx = None;
        self.sync_rx = None;
        self.update_rx = None;
    }
}

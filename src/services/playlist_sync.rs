//! Map theme keys to Spotify playlists and maintain track membership.
//!
//! Both variants honor the same contracts: adding the same track twice
//! results in one membership (checked before appending), and removing
//! under a theme that was never resolved in this process is a no-op
//! (never resolved means never added to, so there is nothing to undo).

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::constants::PLAYLIST_NAME_PREFIX;
use crate::models::Theme;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("unknown theme key: {0}")]
    UnknownTheme(String),
    #[error("Spotify API error: {0}")]
    Api(String),
}

/// Playlist synchronization backend, selected once at startup.
pub enum PlaylistSync {
    Spotify(SpotifySync),
    DryRun(DryRunSync),
}

impl PlaylistSync {
    pub fn add_track(&mut self, theme_key: &str, track_id: &str) -> Result<(), SyncError> {
        match self {
            Self::Spotify(sync) => sync.add_track(theme_key, track_id),
            Self::DryRun(sync) => sync.add_track(theme_key, track_id),
        }
    }

    pub fn remove_track(&mut self, theme_key: &str, track_id: &str) -> Result<(), SyncError> {
        match self {
            Self::Spotify(sync) => sync.remove_track(theme_key, track_id),
            Self::DryRun(sync) => sync.remove_track(theme_key, track_id),
        }
    }
}

/// Live backend talking to the Spotify Web API. Runs on the sync worker
/// thread with the blocking HTTP client.
pub struct SpotifySync {
    token: String,
    themes: Vec<Theme>,
    user_id: Option<String>,
    // theme_key -> playlist id, for the lifetime of the process
    playlist_ids: HashMap<String, String>,
}

impl SpotifySync {
    pub fn new(token: String, themes: Vec<Theme>) -> Self {
        Self {
            token,
            themes,
            user_id: None,
            playlist_ids: HashMap::new(),
        }
    }

    /// Add the track to the theme's playlist. The membership pre-check
    /// makes a repeated call with the same arguments a no-op.
    pub fn add_track(&mut self, theme_key: &str, track_id: &str) -> Result<(), SyncError> {
        let playlist_id = self.resolve_or_create(theme_key)?;
        let present = crate::api::playlists::playlist_contains_track(
            &self.token,
            &playlist_id,
            track_id,
        )
        .map_err(|e| SyncError::Api(e.to_string()))?;
        if present {
            log::debug!(
                "[Sync] Track {} already in playlist for {}, skipping add",
                track_id,
                theme_key
            );
            return Ok(());
        }
        crate::api::playlists::add_track_to_playlist(&self.token, &playlist_id, track_id)
            .map_err(|e| SyncError::Api(e.to_string()))?;
        log::info!("[Sync] Added {} to {}", track_id, theme_key);
        Ok(())
    }

    /// Remove all occurrences of the track from the theme's playlist.
    pub fn remove_track(&mut self, theme_key: &str, track_id: &str) -> Result<(), SyncError> {
        let Some(playlist_id) = self.playlist_ids.get(theme_key).cloned() else {
            log::debug!(
                "[Sync] Playlist for {} never resolved, nothing to remove",
                theme_key
            );
            return Ok(());
        };
        crate::api::playlists::remove_track_from_playlist(&self.token, &playlist_id, track_id)
            .map_err(|e| SyncError::Api(e.to_string()))?;
        log::info!("[Sync] Removed {} from {}", track_id, theme_key);
        Ok(())
    }

    fn resolve_or_create(&mut self, theme_key: &str) -> Result<String, SyncError> {
        if let Some(id) = self.playlist_ids.get(theme_key) {
            return Ok(id.clone());
        }
        let theme = self
            .themes
            .iter()
            .find(|t| t.key == theme_key)
            .ok_or_else(|| SyncError::UnknownTheme(theme_key.to_string()))?
            .clone();
        let playlist_name = format!("{}{}", PLAYLIST_NAME_PREFIX, theme.name);

        let found = crate::api::playlists::find_playlist_by_name(&self.token, &playlist_name)
            .map_err(|e| SyncError::Api(e.to_string()))?;
        let playlist_id = match found {
            Some(id) => id,
            None => {
                let user_id = self.user_id()?;
                log::info!("[Sync] Creating playlist \"{}\"", playlist_name);
                crate::api::playlists::create_playlist(
                    &self.token,
                    &user_id,
                    &playlist_name,
                    &theme.description,
                )
                .map_err(|e| SyncError::Api(e.to_string()))?
            }
        };
        self.playlist_ids
            .insert(theme_key.to_string(), playlist_id.clone());
        Ok(playlist_id)
    }

    fn user_id(&mut self) -> Result<String, SyncError> {
        if let Some(id) = &self.user_id {
            return Ok(id.clone());
        }
        let id = crate::api::users::current_user_id(&self.token)
            .map_err(|e| SyncError::Api(e.to_string()))?;
        self.user_id = Some(id.clone());
        Ok(id)
    }
}

/// Recording backend for simulation runs. No remote calls, same contracts.
#[derive(Debug, Default)]
pub struct DryRunSync {
    added: Vec<(String, String)>,
    removed: Vec<(String, String)>,
    resolved: HashSet<String>,
}

impl DryRunSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_track(&mut self, theme_key: &str, track_id: &str) -> Result<(), SyncError> {
        self.resolved.insert(theme_key.to_string());
        let entry = (theme_key.to_string(), track_id.to_string());
        if !self.added.contains(&entry) {
            log::info!("[Sync] (dry-run) Would add {} to {}", track_id, theme_key);
            self.added.push(entry);
        }
        Ok(())
    }

    pub fn remove_track(&mut self, theme_key: &str, track_id: &str) -> Result<(), SyncError> {
        if !self.resolved.contains(theme_key) {
            return Ok(());
        }
        log::info!("[Sync] (dry-run) Would remove {} from {}", track_id, theme_key);
        self.removed
            .push((theme_key.to_string(), track_id.to_string()));
        Ok(())
    }

    #[allow(dead_code)]
    pub fn added(&self) -> &[(String, String)] {
        &self.added
    }

    #[allow(dead_code)]
    pub fn removed(&self) -> &[(String, String)] {
        &self.removed
    }
}

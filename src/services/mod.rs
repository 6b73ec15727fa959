// Playlist synchronization services

pub mod playlist_sync;
pub mod sync_worker;

pub use playlist_sync::{DryRunSync, PlaylistSync, SpotifySync, SyncError};
pub use sync_worker::{SyncAction, SyncOutcome, SyncWorker};

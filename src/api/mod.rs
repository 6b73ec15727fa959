// Spotify Web API client modules

pub mod playlists;
pub mod tracks;
pub mod users;

// Re-export commonly used functions
pub use tracks::fetch_liked_songs;
pub use users::current_user_profile;

//! Application constants and configuration values

// === Classification ===
pub const LLM_BATCH_SIZE: usize = 10;
pub const PRELOAD_LOOKAHEAD: usize = 12;
pub const LLM_TIMEOUT_SECS: u64 = 90;
pub const LLM_MAX_TOKENS: u32 = 2048;

// === Spotify API ===
pub const LIKED_SONGS_PAGE_SIZE: u32 = 50;
pub const PLAYLIST_SEARCH_PAGE_SIZE: u32 = 50;
pub const PLAYLIST_ITEMS_PAGE_SIZE: u32 = 100;
pub const PLAYLIST_NAME_PREFIX: &str = "\u{1f3b5} ";
pub const SPOTIFY_SCOPE: &str =
    "user-library-read playlist-modify-public playlist-modify-private playlist-read-private";

// === OAuth ===
pub const OAUTH_CALLBACK_TIMEOUT_SECS: u64 = 180;

// === Files (all under the platform config dir) ===
pub const CONFIG_FILE: &str = "config.json";
pub const PROGRESS_FILE: &str = "progress.json";
pub const CACHE_FILE: &str = "classification_cache.json";
pub const EXPORT_CSV_FILE: &str = "export.csv";
pub const TOKEN_FILE: &str = "token.bin";

// === Update check ===
pub const GITHUB_REPO: &str = "nobus/TidyRS";
pub const UPDATE_CHECK_TIMEOUT_SECS: u64 = 5;

// === UI & Layout ===
pub const APP_WIDTH: f32 = 1000.0;
pub const APP_HEIGHT: f32 = 720.0;
pub const TOAST_DURATION_SECS: u64 = 4;

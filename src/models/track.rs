use serde::{Deserialize, Serialize};

/// One liked song as fetched from Spotify. Immutable after the fetch.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub popularity: Option<u8>,
    pub duration_ms: u64,
    pub release_date: String,
    pub explicit: bool,
    pub album_image_url: Option<String>,
    pub preview_url: Option<String>,
}

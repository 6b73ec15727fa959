// Liked-songs endpoint
use serde::Deserialize;

use crate::constants::LIKED_SONGS_PAGE_SIZE;
use crate::models::Track;

#[derive(Debug, Deserialize)]
struct SavedTracksPage {
    items: Vec<SavedItem>,
    total: u32,
}

#[derive(Debug, Deserialize)]
struct SavedItem {
    track: ApiTrack,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: Option<String>,
    name: String,
    #[serde(default)]
    explicit: bool,
    #[serde(default)]
    popularity: Option<u8>,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    #[serde(default)]
    album: ApiAlbum,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize, Default)]
struct ApiAlbum {
    #[serde(default)]
    name: String,
    #[serde(default)]
    release_date: String,
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    url: String,
}

/// Fetch the user's entire liked-songs library, fully paginated. Called
/// once per run; the result order is the session's ordering contract.
pub async fn fetch_liked_songs(token: &str) -> Result<Vec<Track>, Box<dyn std::error::Error>> {
    let mut tracks: Vec<Track> = Vec::new();
    let mut offset: u32 = 0;

    loop {
        let url = format!(
            "https://api.spotify.com/v1/me/tracks?limit={}&offset={}",
            LIKED_SONGS_PAGE_SIZE, offset
        );
        log::debug!("[Tracks] Fetching liked songs at offset {}", offset);

        let response = crate::utils::http::retry_get_with_auth(&url, token).await?;
        if !response.status().is_success() {
            return Err(format!("Spotify API returned status: {}", response.status()).into());
        }

        let page: SavedTracksPage = response.json().await?;
        let page_len = page.items.len();
        for item in page.items {
            if let Some(track) = convert(item.track) {
                tracks.push(track);
            }
        }

        offset += LIKED_SONGS_PAGE_SIZE;
        if page_len == 0 || offset >= page.total {
            break;
        }
    }

    log::info!("[Tracks] Fetched {} liked songs", tracks.len());
    Ok(tracks)
}

// Local files come back with a null id; they cannot be classified or
// synced, so they are dropped here.
fn convert(t: ApiTrack) -> Option<Track> {
    let id = t.id?;
    Some(Track {
        id,
        name: t.name,
        artist: t
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        album: t.album.name,
        popularity: t.popularity,
        duration_ms: t.duration_ms,
        release_date: t.album.release_date,
        explicit: t.explicit,
        album_image_url: t.album.images.first().map(|i| i.url.clone()),
        preview_url: t.preview_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_joins_artists_and_picks_first_image() {
        let api_track = ApiTrack {
            id: Some("t1".to_string()),
            name: "Song".to_string(),
            explicit: true,
            popularity: Some(77),
            duration_ms: 123_000,
            preview_url: None,
            artists: vec![
                ApiArtist {
                    name: "First".to_string(),
                },
                ApiArtist {
                    name: "Second".to_string(),
                },
            ],
            album: ApiAlbum {
                name: "Album".to_string(),
                release_date: "2023-02-03".to_string(),
                images: vec![
                    ApiImage {
                        url: "big.jpg".to_string(),
                    },
                    ApiImage {
                        url: "small.jpg".to_string(),
                    },
                ],
            },
        };

        let track = convert(api_track).unwrap();
        assert_eq!(track.artist, "First, Second");
        assert_eq!(track.album_image_url.as_deref(), Some("big.jpg"));
        assert_eq!(track.popularity, Some(77));
    }

    #[test]
    fn test_convert_drops_local_tracks_without_id() {
        let api_track = ApiTrack {
            id: None,
            name: "Local File".to_string(),
            explicit: false,
            popularity: None,
            duration_ms: 0,
            preview_url: None,
            artists: Vec::new(),
            album: ApiAlbum::default(),
        };
        assert!(convert(api_track).is_none());
    }
}

// Playlist endpoints, blocking variants for the sync worker thread
use serde::Deserialize;
use serde_json::json;

use crate::constants::{PLAYLIST_ITEMS_PAGE_SIZE, PLAYLIST_SEARCH_PAGE_SIZE};

#[derive(Debug, Deserialize)]
struct PlaylistPage {
    items: Vec<PlaylistRef>,
    total: u32,
}

#[derive(Debug, Deserialize)]
struct PlaylistRef {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ItemsPage {
    items: Vec<PlaylistItem>,
    total: u32,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<ItemTrack>,
}

#[derive(Debug, Deserialize)]
struct ItemTrack {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedPlaylist {
    id: String,
}

/// Scan the user's playlists for an exact name match. Paginated; returns
/// the first hit.
pub fn find_playlist_by_name(
    token: &str,
    name: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let mut offset: u32 = 0;
    loop {
        let url = format!(
            "https://api.spotify.com/v1/me/playlists?limit={}&offset={}",
            PLAYLIST_SEARCH_PAGE_SIZE, offset
        );
        let response = crate::utils::http::blocking_get_with_auth(&url, token)?;
        if !response.status().is_success() {
            return Err(format!("Spotify API returned status: {}", response.status()).into());
        }
        let page: PlaylistPage = response.json()?;
        if page.items.is_empty() {
            return Ok(None);
        }
        for playlist in &page.items {
            if playlist.name == name {
                return Ok(Some(playlist.id.clone()));
            }
        }
        offset += PLAYLIST_SEARCH_PAGE_SIZE;
        if offset >= page.total {
            return Ok(None);
        }
    }
}

/// Create a private playlist and return its id.
pub fn create_playlist(
    token: &str,
    user_id: &str,
    name: &str,
    description: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let url = format!("https://api.spotify.com/v1/users/{}/playlists", user_id);
    let body = json!({
        "name": name,
        "public": false,
        "description": description,
    });
    let response = crate::utils::http::blocking_client()
        .post(&url)
        .bearer_auth(token)
        .json(&body)
        .send()?;
    if !response.status().is_success() {
        return Err(format!("Spotify API returned status: {}", response.status()).into());
    }
    let created: CreatedPlaylist = response.json()?;
    Ok(created.id)
}

/// Membership pre-check: paginated scan of the playlist's items.
pub fn playlist_contains_track(
    token: &str,
    playlist_id: &str,
    track_id: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut offset: u32 = 0;
    loop {
        let url = format!(
            "https://api.spotify.com/v1/playlists/{}/tracks?limit={}&offset={}&fields=items(track(id)),total",
            playlist_id, PLAYLIST_ITEMS_PAGE_SIZE, offset
        );
        let response = crate::utils::http::blocking_get_with_auth(&url, token)?;
        if !response.status().is_success() {
            return Err(format!("Spotify API returned status: {}", response.status()).into());
        }
        let page: ItemsPage = response.json()?;
        if page.items.is_empty() {
            return Ok(false);
        }
        let found = page
            .items
            .iter()
            .filter_map(|item| item.track.as_ref())
            .any(|t| t.id.as_deref() == Some(track_id));
        if found {
            return Ok(true);
        }
        offset += PLAYLIST_ITEMS_PAGE_SIZE;
        if offset >= page.total {
            return Ok(false);
        }
    }
}

pub fn add_track_to_playlist(
    token: &str,
    playlist_id: &str,
    track_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("https://api.spotify.com/v1/playlists/{}/tracks", playlist_id);
    let body = json!({ "uris": [format!("spotify:track:{}", track_id)] });
    let response = crate::utils::http::blocking_client()
        .post(&url)
        .bearer_auth(token)
        .json(&body)
        .send()?;
    if !response.status().is_success() {
        return Err(format!("Spotify API returned status: {}", response.status()).into());
    }
    Ok(())
}

/// Remove every occurrence of the track from the playlist.
pub fn remove_track_from_playlist(
    token: &str,
    playlist_id: &str,
    track_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("https://api.spotify.com/v1/playlists/{}/tracks", playlist_id);
    let body = json!({ "tracks": [{ "uri": format!("spotify:track:{}", track_id) }] });
    let response = crate::utils::http::blocking_client()
        .delete(&url)
        .bearer_auth(token)
        .json(&body)
        .send()?;
    if !response.status().is_success() {
        return Err(format!("Spotify API returned status: {}", response.status()).into());
    }
    Ok(())
}

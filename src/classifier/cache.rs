//! Disk-backed cache for classifier suggestions, keyed by content hashes.
//!
//! The namespace covers everything that shapes a classification run
//! (provider, model, theme set, prompt text); the per-track key adds the
//! mutable metadata. Changing any input changes the key, so stale entries
//! are simply never looked up again.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::{Suggestion, Theme, Track};

use super::prompt::SYSTEM_PROMPT;

fn sha256_hex(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash of the full classification configuration.
pub fn build_cache_namespace(provider: &str, model: &str, themes: &[Theme]) -> String {
    let mut payload = format!("provider={};model={}", provider, model);
    for theme in themes {
        payload.push_str(&format!(
            ";theme={}|{}|{}",
            theme.key, theme.name, theme.description
        ));
    }
    payload.push_str(";prompt=");
    payload.push_str(&sha256_hex(SYSTEM_PROMPT));
    sha256_hex(&payload)
}

/// Key for one track's suggestions under a namespace. Covers every
/// metadata field that influences classification.
pub fn build_track_cache_key(namespace: &str, track: &Track) -> String {
    let metadata = format!(
        "id={};name={};artist={};album={};release_date={};duration_ms={};explicit={};popularity={}",
        track.id,
        track.name,
        track.artist,
        track.album,
        track.release_date,
        track.duration_ms,
        track.explicit,
        track
            .popularity
            .map(|p| p.to_string())
            .unwrap_or_else(|| "none".to_string()),
    );
    format!("{}:{}:{}", namespace, track.id, sha256_hex(&metadata))
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct CachePayload {
    #[serde(default)]
    entries: HashMap<String, Vec<Suggestion>>,
}

/// Suggestion cache persisted as a single JSON object. Writes go through a
/// temp file and rename so a crash never leaves a truncated cache.
pub struct PersistentSuggestionCache {
    path: PathBuf,
    entries: HashMap<String, Vec<Suggestion>>,
}

impl PersistentSuggestionCache {
    /// Open the cache at `path`. A missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load_entries(&path);
        Self { path, entries }
    }

    fn load_entries(path: &PathBuf) -> HashMap<String, Vec<Suggestion>> {
        if !path.exists() {
            return HashMap::new();
        }
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<CachePayload>(&raw) {
                Ok(payload) => payload.entries,
                Err(e) => {
                    log::warn!("[Cache] Corrupt cache file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) => {
                log::warn!("[Cache] Failed to read {}: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    pub fn get(&self, key: &str) -> Vec<Suggestion> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a batch of entries. Empty suggestion lists are not persisted,
    /// so a failed classification stays a miss and gets retried next run.
    pub fn put_many(&mut self, values: HashMap<String, Vec<Suggestion>>) {
        let mut changed = false;
        for (key, suggestions) in values {
            if suggestions.is_empty() {
                continue;
            }
            if self.entries.get(&key) != Some(&suggestions) {
                self.entries.insert(key, suggestions);
                changed = true;
            }
        }
        if changed {
            self.save();
        }
    }

    fn save(&self) {
        let payload = CachePayload {
            entries: self.entries.clone(),
        };
        let json = match serde_json::to_string(&payload) {
            Ok(json) => json,
            Err(e) => {
                log::error!("[Cache] Failed to serialize cache: {}", e);
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::error!("[Cache] Failed to create {}: {}", parent.display(), e);
                return;
            }
        }
        let temp_path = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&temp_path, json) {
            log::error!("[Cache] Failed to write {}: {}", temp_path.display(), e);
            return;
        }
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            log::error!("[Cache] Failed to replace {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::theme::default_themes;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: "Song".to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            popularity: Some(42),
            duration_ms: 201_000,
            release_date: "2020-01-01".to_string(),
            explicit: false,
            album_image_url: None,
            preview_url: None,
        }
    }

    fn suggestion(track_id: &str, theme_key: &str) -> Suggestion {
        Suggestion {
            track_id: track_id.to_string(),
            theme_key: theme_key.to_string(),
            confidence: 0.8,
            reasoning: "fits".to_string(),
        }
    }

    #[test]
    fn test_namespace_is_deterministic() {
        let themes = default_themes();
        let a = build_cache_namespace("openai", "gpt-4o-mini", &themes);
        let b = build_cache_namespace("openai", "gpt-4o-mini", &themes);
        assert_eq!(a, b);
    }

    #[test]
    fn test_namespace_changes_with_any_input() {
        let themes = default_themes();
        let base = build_cache_namespace("openai", "gpt-4o-mini", &themes);

        assert_ne!(base, build_cache_namespace("anthropic", "gpt-4o-mini", &themes));
        assert_ne!(base, build_cache_namespace("openai", "gpt-4o", &themes));

        let mut altered = default_themes();
        altered[0].description.push_str(" slightly different");
        assert_ne!(base, build_cache_namespace("openai", "gpt-4o-mini", &altered));
    }

    #[test]
    fn test_track_key_is_deterministic() {
        let ns = build_cache_namespace("openai", "gpt-4o-mini", &default_themes());
        assert_eq!(
            build_track_cache_key(&ns, &track("t1")),
            build_track_cache_key(&ns, &track("t1"))
        );
    }

    #[test]
    fn test_track_key_changes_when_any_metadata_field_changes() {
        let ns = build_cache_namespace("openai", "gpt-4o-mini", &default_themes());
        let base_key = build_track_cache_key(&ns, &track("t1"));

        let mutations: Vec<Box<dyn Fn(&mut Track)>> = vec![
            Box::new(|t| t.name = "Other".to_string()),
            Box::new(|t| t.artist = "Other".to_string()),
            Box::new(|t| t.album = "Other".to_string()),
            Box::new(|t| t.release_date = "1999-12-31".to_string()),
            Box::new(|t| t.duration_ms += 1),
            Box::new(|t| t.explicit = true),
            Box::new(|t| t.popularity = Some(43)),
            Box::new(|t| t.popularity = None),
        ];
        for mutate in mutations {
            let mut changed = track("t1");
            mutate(&mut changed);
            assert_ne!(base_key, build_track_cache_key(&ns, &changed));
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = PersistentSuggestionCache::open(&path);
        let mut values = HashMap::new();
        values.insert("key1".to_string(), vec![suggestion("t1", "ambiance")]);
        cache.put_many(values);

        let reopened = PersistentSuggestionCache::open(&path);
        assert_eq!(reopened.get("key1"), vec![suggestion("t1", "ambiance")]);
        assert!(reopened.get("missing").is_empty());
    }

    #[test]
    fn test_empty_entries_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = PersistentSuggestionCache::open(&path);
        let mut values = HashMap::new();
        values.insert("empty".to_string(), Vec::new());
        cache.put_many(values);

        assert!(!path.exists());
        assert!(PersistentSuggestionCache::open(&path).is_empty());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "not json at all").unwrap();

        let cache = PersistentSuggestionCache::open(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_replaces_file_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = PersistentSuggestionCache::open(&path);
        let mut first = HashMap::new();
        first.insert("key1".to_string(), vec![suggestion("t1", "ambiance")]);
        cache.put_many(first);

        let mut second = HashMap::new();
        second.insert("key2".to_string(), vec![suggestion("t2", "lets_dance")]);
        cache.put_many(second);

        // no temp file left behind, final file parses and holds both entries
        assert!(!path.with_extension("json.tmp").exists());
        let reopened = PersistentSuggestionCache::open(&path);
        assert_eq!(reopened.len(), 2);
    }
}

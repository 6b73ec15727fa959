//! Batched LLM classification with two levels of memoization: an
//! in-memory map for the process lifetime and a disk cache across runs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::constants::LLM_TIMEOUT_SECS;
use crate::models::{Suggestion, Theme, Track};
use crate::utils::error_handling::safe_lock;

use super::cache::{build_cache_namespace, build_track_cache_key, PersistentSuggestionCache};
use super::prompt::{build_system_prompt, build_tracks_prompt, parse_suggestions};
use super::provider::{complete, Provider};

/// Progress of a background preload job, polled by the UI.
#[derive(Debug, Clone)]
pub struct PreloadStatus {
    pub done: usize,
    pub total: usize,
    pub running: bool,
    pub error: Option<String>,
}

pub struct Classifier {
    provider: Provider,
    api_key: String,
    model: String,
    themes: Vec<Theme>,
    namespace: String,
    timeout: Duration,
    persistent_enabled: bool,
    memory: Mutex<HashMap<String, Vec<Suggestion>>>,
    persistent: Mutex<PersistentSuggestionCache>,
    // Preload cancellation: each preload call bumps the generation and
    // prior jobs abort at their next chunk boundary.
    preload_generation: AtomicU64,
}

impl Classifier {
    pub fn new(
        provider: Provider,
        api_key: String,
        model: String,
        themes: Vec<Theme>,
        cache_path: PathBuf,
    ) -> Self {
        let model = if model.is_empty() {
            provider.default_model().to_string()
        } else {
            model
        };
        let timeout_secs = std::env::var("TIDYRS_LLM_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(LLM_TIMEOUT_SECS);
        let persistent_enabled = !std::env::var("TIDYRS_DISABLE_CACHE")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        let namespace = build_cache_namespace(provider.key(), &model, &themes);

        Self {
            provider,
            api_key,
            model,
            themes,
            namespace,
            timeout: Duration::from_secs(timeout_secs),
            persistent_enabled,
            memory: Mutex::new(HashMap::new()),
            persistent: Mutex::new(PersistentSuggestionCache::open(cache_path)),
            preload_generation: AtomicU64::new(0),
        }
    }

    /// Pure in-memory lookup. Never touches the network.
    pub fn get_suggestions(&self, track_id: &str) -> Vec<Suggestion> {
        safe_lock(&self.memory, "Classifier")
            .and_then(|m| m.get(track_id).cloned())
            .unwrap_or_default()
    }

    /// True once a batch covering this track has completed, even when it
    /// produced no suggestions.
    pub fn is_known(&self, track_id: &str) -> bool {
        safe_lock(&self.memory, "Classifier")
            .map(|m| m.contains_key(track_id))
            .unwrap_or(false)
    }

    /// Classify a batch of tracks, returning the suggestions for every
    /// input track. Memory hits cost nothing, disk hits cost a lookup, and
    /// only the remainder goes out in a single batched prompt.
    pub async fn classify_batch(&self, tracks: &[Track]) -> Result<Vec<Suggestion>, String> {
        if tracks.is_empty() {
            return Ok(Vec::new());
        }

        let mut uncached: Vec<Track> = Vec::new();
        let mut disk_hits = 0usize;
        {
            let mut memory = safe_lock(&self.memory, "Classifier")
                .ok_or_else(|| "Classifier memory cache unavailable".to_string())?;
            let persistent = safe_lock(&self.persistent, "Classifier")
                .ok_or_else(|| "Classifier disk cache unavailable".to_string())?;
            for track in tracks {
                if memory.contains_key(&track.id) {
                    continue;
                }
                if self.persistent_enabled {
                    let key = build_track_cache_key(&self.namespace, track);
                    let persisted = persistent.get(&key);
                    if !persisted.is_empty() {
                        memory.insert(track.id.clone(), persisted);
                        disk_hits += 1;
                        continue;
                    }
                }
                uncached.push(track.clone());
            }
        }

        if disk_hits > 0 {
            log::info!(
                "[Classifier] Disk cache hits={} misses={}",
                disk_hits,
                uncached.len()
            );
        }

        if uncached.is_empty() {
            return Ok(self.collect_cached(tracks));
        }

        let system = build_system_prompt(&self.themes);
        let user_msg = build_tracks_prompt(&uncached);
        log::info!(
            "[Classifier] {} request started (model={}, uncached_tracks={})",
            self.provider.label(),
            self.model,
            uncached.len()
        );

        let text = complete(
            self.provider,
            &self.api_key,
            &self.model,
            &system,
            &user_msg,
            self.timeout,
        )
        .await?;

        let suggestions = parse_suggestions(&text);
        log::info!(
            "[Classifier] {} request completed (suggestions={})",
            self.provider.label(),
            suggestions.len()
        );

        // Group replies per requested track. Tracks the model ignored get
        // an empty entry and are not re-queried this run.
        let mut grouped: HashMap<String, Vec<Suggestion>> = uncached
            .iter()
            .map(|t| (t.id.clone(), Vec::new()))
            .collect();
        for suggestion in suggestions {
            if let Some(bucket) = grouped.get_mut(&suggestion.track_id) {
                bucket.push(suggestion);
            }
        }

        let mut to_persist: HashMap<String, Vec<Suggestion>> = HashMap::new();
        {
            let mut memory = safe_lock(&self.memory, "Classifier")
                .ok_or_else(|| "Classifier memory cache unavailable".to_string())?;
            for track in &uncached {
                let bucket = grouped.remove(&track.id).unwrap_or_default();
                if self.persistent_enabled && !bucket.is_empty() {
                    to_persist.insert(build_track_cache_key(&self.namespace, track), bucket.clone());
                }
                memory.insert(track.id.clone(), bucket);
            }
        }
        if !to_persist.is_empty() {
            if let Some(mut persistent) = safe_lock(&self.persistent, "Classifier") {
                persistent.put_many(to_persist);
            }
        }

        Ok(self.collect_cached(tracks))
    }

    fn collect_cached(&self, tracks: &[Track]) -> Vec<Suggestion> {
        let Some(memory) = safe_lock(&self.memory, "Classifier") else {
            return Vec::new();
        };
        tracks
            .iter()
            .flat_map(|t| memory.get(&t.id).cloned().unwrap_or_default())
            .collect()
    }

    /// Warm the cache for the upcoming tracks on a background thread.
    ///
    /// Each call supersedes any preload still in flight: the generation
    /// counter is bumped and the old job stops at its next chunk boundary.
    /// Progress lands on `status_tx` after every chunk.
    pub fn preload(
        self: &Arc<Self>,
        tracks: Vec<Track>,
        batch_size: usize,
        status_tx: Sender<PreloadStatus>,
    ) {
        let generation = self.preload_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let classifier = Arc::clone(self);
        let batch_size = batch_size.max(1);

        crate::utils::async_helper::spawn_fire_and_forget(move || {
            Box::pin(async move {
                let total = tracks.len();
                let mut done = 0usize;
                for chunk in tracks.chunks(batch_size) {
                    if classifier.preload_generation.load(Ordering::SeqCst) != generation {
                        log::debug!("[Classifier] Preload superseded, stopping");
                        return Ok(());
                    }
                    match classifier.classify_batch(chunk).await {
                        Ok(_) => {
                            done += chunk.len();
                            let _ = status_tx.send(PreloadStatus {
                                done,
                                total,
                                running: done < total,
                                error: None,
                            });
                        }
                        Err(e) => {
                            if classifier.preload_generation.load(Ordering::SeqCst) != generation {
                                return Ok(());
                            }
                            log::warn!("[Classifier] Preload batch failed: {}", e);
                            let _ = status_tx.send(PreloadStatus {
                                done,
                                total,
                                running: false,
                                error: Some(e),
                            });
                            return Ok(());
                        }
                    }
                }
                Ok(())
            })
        });
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

    fn suggestion(track_id: &str) -> Suggestion {
        Suggestion {
            track_id: track_id.to_string(),
            theme_key: "ambiance".to_string(),
            confidence: 0.7,
            reasoning: "warm".to_string(),
        }
    }

    fn classifier(cache_path: PathBuf) -> Classifier {
        Classifier::new(
            Provider::OpenAi,
            "test-key".to_string(),
            String::new(),
            default_themes(),
            cache_path,
        )
    }

    #[test]
    fn test_get_suggestions_is_empty_before_any_batch() {
        let dir = tempfile::tempdir().unwrap();
        let c = classifier(dir.path().join("cache.json"));
        assert!(c.get_suggestions("t1").is_empty());
        assert!(!c.is_known("t1"));
    }

    #[test]
    fn test_model_defaults_per_provider() {
        let dir = tempfile::tempdir().unwrap();
        let c = classifier(dir.path().join("cache.json"));
        assert_eq!(c.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_disk_hits_populate_memory_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");

        // Seed the disk cache under the key this classifier will derive.
        let namespace =
            build_cache_namespace(Provider::OpenAi.key(), "gpt-4o-mini", &default_themes());
        let key = build_track_cache_key(&namespace, &track("t1"));
        let mut seeded = PersistentSuggestionCache::open(&cache_path);
        let mut values = HashMap::new();
        values.insert(key, vec![suggestion("t1")]);
        seeded.put_many(values);

        // Every track resolves from disk, so no request is attempted and
        // the bogus API key never matters.
        let c = classifier(cache_path);
        let result = c.classify_batch(&[track("t1")]).await.unwrap();
        assert_eq!(result, vec![suggestion("t1")]);
        assert!(c.is_known("t1"));
        assert_eq!(c.get_suggestions("t1"), vec![suggestion("t1")]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let c = classifier(dir.path().join("cache.json"));
        assert!(c.classify_batch(&[]).await.unwrap().is_empty());
    }
}

//! Persistent user configuration stored as JSON in the platform config dir.
//!
//! The config is an explicit struct handed to each component at startup;
//! there is no process-wide mutable configuration state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::CONFIG_FILE;
use crate::models::theme::default_themes;
use crate::models::Theme;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub llm_provider: String,
    pub llm_model: String,
    pub llm_api_key: String,
    pub simulation_mode: bool,
    pub themes: Vec<Theme>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            spotify_client_id: String::new(),
            spotify_client_secret: String::new(),
            spotify_redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
            llm_provider: "openai".to_string(),
            llm_model: String::new(),
            llm_api_key: String::new(),
            simulation_mode: false,
            themes: default_themes(),
        }
    }
}

impl UserConfig {
    /// Directory holding config.json and the app's cache/progress files.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::APP_NAME)
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load from disk, merged with defaults. Missing or corrupt files fall
    /// back to defaults and are never fatal.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("[Config] Corrupt config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("[Config] Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// All credentials present, so the setup screen can be skipped.
    pub fn is_configured(&self) -> bool {
        !self.spotify_client_id.is_empty()
            && !self.spotify_client_secret.is_empty()
            && !self.llm_api_key.is_empty()
            && !self.llm_provider.is_empty()
    }

    pub fn theme(&self, key: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_not_configured() {
        let cfg = UserConfig::default();
        assert!(!cfg.is_configured());
        assert_eq!(cfg.llm_provider, "openai");
        assert_eq!(cfg.themes.len(), 2);
    }

    #[test]
    fn test_is_configured_needs_all_credentials() {
        let mut cfg = UserConfig {
            spotify_client_id: "id".to_string(),
            spotify_client_secret: "secret".to_string(),
            llm_api_key: "sk-test".to_string(),
            ..UserConfig::default()
        };
        assert!(cfg.is_configured());

        cfg.llm_api_key.clear();
        assert!(!cfg.is_configured());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cfg = UserConfig {
            spotify_client_id: "abc".to_string(),
            simulation_mode: true,
            ..UserConfig::default()
        };
        cfg.save_to(&path).unwrap();

        let loaded = UserConfig::load_from(&path);
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"llm_provider": "anthropic"}"#).unwrap();

        let loaded = UserConfig::load_from(&path);
        assert_eq!(loaded.llm_provider, "anthropic");
        assert_eq!(loaded.spotify_redirect_uri, "http://127.0.0.1:8888/callback");
        assert_eq!(loaded.themes, default_themes());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert_eq!(UserConfig::load_from(&path), UserConfig::default());
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert_eq!(UserConfig::load_from(&path), UserConfig::default());
    }
}

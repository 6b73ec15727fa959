//! Encrypted at-rest storage for OAuth tokens.
//!
//! The token file is an AES-256-GCM envelope (12-byte random nonce
//! prepended to the ciphertext), base64-encoded. The key is derived from
//! stable local identifiers, so the file is unreadable when copied to
//! another machine or user account.

use std::fs;
use std::io;
use std::path::PathBuf;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: u64,
}

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, token: &TokenData) -> Result<(), String> {
        let plaintext =
            serde_json::to_vec(token).map_err(|e| format!("Token serialization failed: {}", e))?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&derive_key()));
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_ref())
            .map_err(|e| format!("Token encryption failed: {}", e))?;

        let mut blob = nonce_bytes.to_vec();
        blob.extend_from_slice(&ciphertext);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        fs::write(&self.path, BASE64.encode(blob))
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }

    /// Load and decrypt the persisted token. Any failure (missing file,
    /// bad base64, wrong key, tampered data) yields `None`; the user just
    /// authenticates again.
    pub fn load(&self) -> Option<TokenData> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let blob = match BASE64.decode(raw.trim()) {
            Ok(blob) => blob,
            Err(e) => {
                log::warn!("[TokenStore] Corrupt token file {}: {}", self.path.display(), e);
                return None;
            }
        };
        if blob.len() <= NONCE_LEN {
            log::warn!("[TokenStore] Token file {} too short", self.path.display());
            return None;
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&derive_key()));
        let plaintext = match cipher.decrypt(Nonce::from_slice(nonce_bytes), ciphertext) {
            Ok(plaintext) => plaintext,
            Err(_) => {
                log::warn!("[TokenStore] Could not decrypt {}", self.path.display());
                return None;
            }
        };
        match serde_json::from_slice(&plaintext) {
            Ok(token) => Some(token),
            Err(e) => {
                log::warn!("[TokenStore] Corrupt token payload: {}", e);
                None
            }
        }
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

fn derive_key() -> [u8; 32] {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default();
    let config_dir = dirs::config_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let seed = format!("{}:{}:{}", crate::APP_NAME, user, config_dir);
    Sha256::digest(seed.as_bytes()).into()
}

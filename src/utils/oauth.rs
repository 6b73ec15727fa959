//! Spotify OAuth authorization-code flow with a local callback server.
//!
//! The flow runs on a plain background thread: build the authorize URL,
//! open the browser, catch the redirect on a one-shot tiny_http server,
//! exchange the code for tokens. Errors carry user-facing hints since
//! they end up on the setup screen.

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::RngCore;
use serde::Deserialize;

use crate::constants::{OAUTH_CALLBACK_TIMEOUT_SECS, SPOTIFY_SCOPE, TOKEN_FILE};
use crate::storage::UserConfig;
use crate::utils::token_store::{TokenData, TokenStore};

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

// Refresh slightly before the advertised expiry.
const EXPIRY_MARGIN_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthConfig {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
        }
    }
}

pub struct OAuthManager {
    config: OAuthConfig,
    store: TokenStore,
    token: Option<TokenData>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: u64,
}

impl OAuthManager {
    pub fn new(config: OAuthConfig) -> Self {
        let store = TokenStore::new(UserConfig::config_dir().join(TOKEN_FILE));
        let token = store.load();
        if token.is_some() {
            log::info!("[OAuth] Loaded persisted token");
        }
        Self {
            config,
            store,
            token,
        }
    }

    /// Valid (non-expired) access token, if any.
    pub fn access_token(&self) -> Option<String> {
        let token = self.token.as_ref()?;
        if now_secs() < token.expires_at {
            Some(token.access_token.clone())
        } else {
            None
        }
    }

    /// Make sure a valid token exists: reuse, refresh, or run the full
    /// browser flow. Blocks until done, so call it off the UI thread.
    pub fn authenticate(&mut self) -> Result<String, String> {
        if let Some(token) = self.access_token() {
            return Ok(token);
        }
        if self.token.as_ref().and_then(|t| t.refresh_token.clone()).is_some() {
            match self.refresh() {
                Ok(()) => {
                    if let Some(token) = self.access_token() {
                        return Ok(token);
                    }
                }
                Err(e) => log::warn!("[OAuth] Token refresh failed: {}", e),
            }
        }

        let state = random_state();
        let authorize_url = format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            AUTHORIZE_URL,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(SPOTIFY_SCOPE),
            state
        );
        let code = self.wait_for_callback(&authorize_url, &state)?;
        self.exchange_code(&code)?;
        self.access_token()
            .ok_or_else(|| "Token exchange produced no usable token".to_string())
    }

    fn wait_for_callback(&self, authorize_url: &str, expected_state: &str) -> Result<String, String> {
        let addr = callback_addr(&self.config.redirect_uri)?;
        let server = tiny_http::Server::http(&addr).map_err(|e| {
            format!(
                "Could not listen on {} (is the port in use by another app, or the redirect URI wrong?): {}",
                addr, e
            )
        })?;

        if let Err(e) = webbrowser::open(authorize_url) {
            log::warn!("[OAuth] Could not open browser: {}", e);
            log::info!("[OAuth] Open this URL manually: {}", authorize_url);
        }
        log::info!("[OAuth] Waiting for Spotify redirect on {}", addr);

        let deadline = Instant::now() + Duration::from_secs(OAUTH_CALLBACK_TIMEOUT_SECS);
        loop {
            if Instant::now() >= deadline {
                return Err("Timed out waiting for the Spotify login redirect".to_string());
            }
            let request = match server.recv_timeout(Duration::from_millis(500)) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(e) => return Err(format!("Callback server failed: {}", e)),
            };

            let params = parse_query(request.url());
            if let Some(error) = params.get("error") {
                respond(request, "Authorization was denied. You can close this window.");
                return Err(format!("Spotify denied authorization: {}", error));
            }
            let Some(code) = params.get("code").cloned() else {
                // favicon requests and the like
                respond(request, "Waiting for Spotify authorization...");
                continue;
            };
            if params.get("state").map(String::as_str) != Some(expected_state) {
                respond(request, "State mismatch. You can close this window.");
                return Err(
                    "State mismatch in the OAuth callback (check the redirect URI configured in your Spotify app)"
                        .to_string(),
                );
            }

            respond(request, "All set! You can close this window and return to TidyRS.");
            return Ok(code);
        }
    }

    fn exchange_code(&mut self, code: &str) -> Result<(), String> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        let token = self.token_request(&params)?;
        self.remember(token);
        Ok(())
    }

    /// Trade the refresh token for a fresh access token.
    pub fn refresh(&mut self) -> Result<(), String> {
        let refresh_token = self
            .token
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
            .ok_or_else(|| "No refresh token available".to_string())?;
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let mut token = self.token_request(&params)?;
        // Spotify often omits the refresh token on renewal; keep the old one.
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token);
        }
        self.remember(token);
        Ok(())
    }

    fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, String> {
        let response = crate::utils::http::blocking_client()
            .post(TOKEN_URL)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(params)
            .send()
            .map_err(|e| format!("Token request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!(
                "Token request rejected with status {} (check your Spotify client id/secret and that the redirect URI matches the app settings)",
                status
            ));
        }
        response
            .json::<TokenResponse>()
            .map_err(|e| format!("Token reply was not JSON: {}", e))
    }

    fn remember(&mut self, response: TokenResponse) {
        let expires_at = now_secs() + response.expires_in.saturating_sub(EXPIRY_MARGIN_SECS);
        let token = TokenData {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at,
        };
        if let Err(e) = self.store.save(&token) {
            log::warn!("[OAuth] Could not persist token: {}", e);
        }
        self.token = Some(token);
    }

    /// Drop the session and the persisted token.
    #[allow(dead_code)]
    pub fn logout(&mut self) {
        self.token = None;
        if let Err(e) = self.store.clear() {
            log::warn!("[OAuth] Could not remove token file: {}", e);
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn random_state() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Extract `host:port` from the redirect URI for the local listener.
fn callback_addr(redirect_uri: &str) -> Result<String, String> {
    let rest = redirect_uri
        .strip_prefix("http://")
        .ok_or_else(|| format!("Redirect URI must be http://host:port/path, got {}", redirect_uri))?;
    let host_port = rest.split('/').next().unwrap_or(rest);
    if host_port.contains(':') {
        Ok(host_port.to_string())
    } else {
        Ok(format!("{}:80", host_port))
    }
}

fn parse_query(url: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let Some(query) = url.split_once('?').map(|(_, q)| q) else {
        return params;
    };
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.to_string());
        params.insert(key.to_string(), value);
    }
    params
}

fn respond(request: tiny_http::Request, message: &str) {
    let html = format!(
        "<html><body style=\"font-family: sans-serif; text-align: center; margin-top: 20%\"><h2>{}</h2></body></html>",
        message
    );
    let mut response = tiny_http::Response::from_string(html);
    if let Ok(header) =
        tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
    {
        response = response.with_header(header);
    }
    if let Err(e) = request.respond(response) {
        log::debug!("[OAuth] Failed to answer callback request: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_addr_extracts_host_and_port() {
        assert_eq!(
            callback_addr("http://127.0.0.1:8888/callback").unwrap(),
            "127.0.0.1:8888"
        );
        assert_eq!(callback_addr("http://localhost/cb").unwrap(), "localhost:80");
        assert!(callback_addr("https://example.com/cb").is_err());
    }

    #[test]
    fn test_parse_query_decodes_values() {
        let params = parse_query("/callback?code=abc%2Fdef&state=xyz");
        assert_eq!(params.get("code").map(String::as_str), Some("abc/def"));
        assert_eq!(params.get("state").map(String::as_str), Some("xyz"));
        assert!(parse_query("/callback").is_empty());
    }

    #[test]
    fn test_random_state_is_hex_and_unique() {
        let a = random_state();
        let b = random_state();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}

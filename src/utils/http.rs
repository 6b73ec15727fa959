//! Shared HTTP clients and small request helpers.

use std::time::Duration;

use once_cell::sync::Lazy;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY_MS: u64 = 300;

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

// Used only from dedicated worker threads; a blocking client must never be
// created or driven on a runtime thread.
static BLOCKING_CLIENT: Lazy<reqwest::blocking::Client> = Lazy::new(|| {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::blocking::Client::new())
});

pub fn client() -> &'static reqwest::Client {
    &CLIENT
}

pub fn blocking_client() -> &'static reqwest::blocking::Client {
    &BLOCKING_CLIENT
}

/// GET with bearer auth, retrying once on a transport error.
pub async fn retry_get_with_auth(
    url: &str,
    token: &str,
) -> Result<reqwest::Response, Box<dyn std::error::Error>> {
    match CLIENT.get(url).bearer_auth(token).send().await {
        Ok(response) => Ok(response),
        Err(first) => {
            log::debug!("[Http] GET {} failed ({}), retrying once", url, first);
            tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
            Ok(CLIENT.get(url).bearer_auth(token).send().await?)
        }
    }
}

/// Blocking twin of [`retry_get_with_auth`] for the sync worker thread.
pub fn blocking_get_with_auth(
    url: &str,
    token: &str,
) -> Result<reqwest::blocking::Response, Box<dyn std::error::Error>> {
    match BLOCKING_CLIENT.get(url).bearer_auth(token).send() {
        Ok(response) => Ok(response),
        Err(first) => {
            log::debug!("[Http] GET {} failed ({}), retrying once", url, first);
            std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS));
            Ok(BLOCKING_CLIENT.get(url).bearer_auth(token).send()?)
        }
    }
}

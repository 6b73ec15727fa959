//! LLM provider selection and the chat endpoints behind it.

use std::time::Duration;

use serde_json::{json, Value};

use crate::constants::LLM_MAX_TOKENS;

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Supported LLM providers, selected once at startup from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI (GPT)",
            Self::Anthropic => "Anthropic",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-haiku-20240307",
        }
    }
}

/// One completion round-trip: system + user message in, raw reply text out.
pub async fn complete(
    provider: Provider,
    api_key: &str,
    model: &str,
    system: &str,
    user_msg: &str,
    timeout: Duration,
) -> Result<String, String> {
    match provider {
        Provider::OpenAi => call_openai(api_key, model, system, user_msg, timeout).await,
        Provider::Anthropic => call_anthropic(api_key, model, system, user_msg, timeout).await,
    }
}

async fn call_openai(
    api_key: &str,
    model: &str,
    system: &str,
    user_msg: &str,
    timeout: Duration,
) -> Result<String, String> {
    let body = json!({
        "model": model,
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": user_msg},
        ],
        "max_tokens": LLM_MAX_TOKENS,
    });

    let response = crate::utils::http::client()
        .post(OPENAI_ENDPOINT)
        .bearer_auth(api_key)
        .timeout(timeout)
        .json(&body)
        .send()
        .await
        .map_err(|e| format!("OpenAI request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("OpenAI API returned status: {}", response.status()));
    }

    let payload: Value = response
        .json()
        .await
        .map_err(|e| format!("OpenAI reply was not JSON: {}", e))?;
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| "OpenAI reply missing message content".to_string())
}

async fn call_anthropic(
    api_key: &str,
    model: &str,
    system: &str,
    user_msg: &str,
    timeout: Duration,
) -> Result<String, String> {
    let body = json!({
        "model": model,
        "max_tokens": LLM_MAX_TOKENS,
        "system": system,
        "messages": [{"role": "user", "content": user_msg}],
    });

    let response = crate::utils::http::client()
        .post(ANTHROPIC_ENDPOINT)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .timeout(timeout)
        .json(&body)
        .send()
        .await
        .map_err(|e| format!("Anthropic request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!(
            "Anthropic API returned status: {}",
            response.status()
        ));
    }

    let payload: Value = response
        .json()
        .await
        .map_err(|e| format!("Anthropic reply was not JSON: {}", e))?;
    payload["content"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| "Anthropic reply missing text content".to_string())
}

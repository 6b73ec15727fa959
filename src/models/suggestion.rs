use serde::{Deserialize, Serialize};

/// An LLM-proposed theme for a track, with confidence and rationale.
/// A track can carry zero, one, or several suggestions.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Suggestion {
    pub track_id: String,
    pub theme_key: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

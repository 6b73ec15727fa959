//! Prompt construction and response parsing for the LLM classifier.

use serde::Deserialize;

use crate::models::{Suggestion, Theme, Track};

pub const SYSTEM_PROMPT: &str = r#"You are a music classification assistant. You classify songs into playlist themes based on their metadata.

Available themes:
{themes}

For each track, suggest the BEST matching theme. A track can match multiple themes.
Respond with valid JSON only - an array of objects with these fields:
- track_id: string
- suggested_theme: string (theme key)
- confidence: float (0.0-1.0)
- reasoning: string (brief explanation)

If a track could fit multiple themes, return one entry per theme for that track."#;

pub fn build_system_prompt(themes: &[Theme]) -> String {
    let catalogue = themes
        .iter()
        .map(|t| format!("- \"{}\": {} — {}", t.key, t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");
    SYSTEM_PROMPT.replace("{themes}", &catalogue)
}

pub fn build_tracks_prompt(tracks: &[Track]) -> String {
    let mut lines = vec!["Classify these tracks:\n".to_string()];
    for t in tracks {
        let popularity = t
            .popularity
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let release_date = if t.release_date.is_empty() {
            "unknown"
        } else {
            t.release_date.as_str()
        };
        let duration_secs = (t.duration_ms + 500) / 1000;
        let explicit = if t.explicit { "yes" } else { "no" };
        lines.push(format!(
            "- ID: {}, Title: \"{}\", Artist: \"{}\", Album: \"{}\", Release Date: {}, Duration Sec: {}, Explicit: {}, Popularity: {}",
            t.id, t.name, t.artist, t.album, release_date, duration_secs, explicit, popularity
        ));
    }
    lines.join("\n")
}

// Wire shape of one reply entry. Missing fields default.
#[derive(Debug, Deserialize)]
struct RawSuggestion {
    #[serde(default)]
    track_id: String,
    #[serde(default)]
    suggested_theme: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

/// Parse the model's reply into suggestions.
///
/// Tolerates a markdown code fence around the JSON array. Anything that
/// does not parse as an array of objects yields an empty list.
pub fn parse_suggestions(text: &str) -> Vec<Suggestion> {
    let cleaned = strip_code_fence(text.trim());
    let raw: Vec<RawSuggestion> = match serde_json::from_str(&cleaned) {
        Ok(items) => items,
        Err(_) => return Vec::new(),
    };
    raw.into_iter()
        .map(|r| Suggestion {
            track_id: r.track_id,
            theme_key: r.suggested_theme,
            confidence: r.confidence,
            reasoning: r.reasoning,
        })
        .collect()
}

fn strip_code_fence(text: &str) -> String {
    if !text.starts_with("```") {
        return text.to_string();
    }
    let mut lines: Vec<&str> = text.lines().collect();
    lines.remove(0);
    if lines.last().map(|l| l.trim() == "```").unwrap_or(false) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::theme::default_themes;

    fn track(id: &str, name: &str) -> Track {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            popularity: None,
            duration_ms: 187_400,
            release_date: String::new(),
            explicit: true,
            album_image_url: None,
            preview_url: None,
        }
    }

    #[test]
    fn test_system_prompt_lists_every_theme() {
        let prompt = build_system_prompt(&default_themes());
        assert!(prompt.contains("\"ambiance\": Ambiance"));
        assert!(prompt.contains("\"lets_dance\": Let's Dance"));
        assert!(!prompt.contains("{themes}"));
    }

    #[test]
    fn test_tracks_prompt_includes_metadata_fields() {
        let prompt = build_tracks_prompt(&[track("t1", "Song")]);
        assert!(prompt.contains("ID: t1"));
        assert!(prompt.contains("Duration Sec: 187"));
        assert!(prompt.contains("Explicit: yes"));
        assert!(prompt.contains("Popularity: unknown"));
        assert!(prompt.contains("Release Date: unknown"));
    }

    #[test]
    fn test_parse_plain_array() {
        let text = r#"[{"track_id": "t1", "suggested_theme": "ambiance", "confidence": 0.9, "reasoning": "chill"}]"#;
        let suggestions = parse_suggestions(text);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].track_id, "t1");
        assert_eq!(suggestions[0].theme_key, "ambiance");
        assert!((suggestions[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_parse_fenced_array_matches_plain() {
        let plain = r#"[{"track_id": "t1", "suggested_theme": "ambiance", "confidence": 0.5, "reasoning": "r"}]"#;
        let fenced = format!("```json\n{}\n```", plain);
        assert_eq!(parse_suggestions(&fenced), parse_suggestions(plain));
    }

    #[test]
    fn test_parse_non_json_yields_empty() {
        assert!(parse_suggestions("I cannot classify these tracks.").is_empty());
        assert!(parse_suggestions("").is_empty());
        assert!(parse_suggestions("{\"not\": \"an array\"}").is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let suggestions = parse_suggestions(r#"[{"track_id": "t1"}]"#);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].theme_key, "");
        assert_eq!(suggestions[0].confidence, 0.0);
        assert_eq!(suggestions[0].reasoning, "");
    }
}

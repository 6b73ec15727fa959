use serde::{Deserialize, Serialize};

/// A named destination category (and matching target playlist) a track can
/// be assigned to. The theme set is fixed for the whole run.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Theme {
    pub key: String,
    pub name: String,
    pub description: String,
    pub shortcut: char,
}

impl Theme {
    pub fn new(key: &str, name: &str, description: &str, shortcut: char) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            shortcut,
        }
    }
}

/// Built-in theme set used until the user configures their own.
pub fn default_themes() -> Vec<Theme> {
    vec![
        Theme::new(
            "ambiance",
            "Ambiance",
            "Mid-tempo, groovy, warm, melodic tracks. Can move gently but stays chill.",
            '1',
        ),
        Theme::new(
            "lets_dance",
            "Let's Dance",
            "Upbeat, danceable, recent party hits. High energy.",
            '2',
        ),
    ]
}

use serde::{Deserialize, Serialize};

/// The recorded outcome for one track: assigned theme keys, or skipped.
/// A skip always carries an empty theme list.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Decision {
    pub track_id: String,
    pub track_name: String,
    pub artist: String,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub skipped: bool,
}

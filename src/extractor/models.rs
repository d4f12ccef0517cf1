//! Data structures for extracted media information

use serde::{Deserialize, Serialize};

/// format_id of the unprocessed source file
pub const ORIGINAL_FORMAT_ID: &str = "Original";

/// Extraction result for one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    #[serde(alias = "webpage_url")]
    pub url: String,
    #[serde(default)]
    pub duration: Option<u64>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub formats: Vec<Format>,
    pub extractor: Option<String>,
}

impl VideoInfo {
    pub fn format(&self, format_id: &str) -> Option<&Format> {
        self.formats.iter().find(|f| f.format_id == format_id)
    }

    pub fn original(&self) -> Option<&Format> {
        self.format(ORIGINAL_FORMAT_ID)
    }
}

/// One playable or downloadable variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub format_id: String,
    pub url: String,
    pub ext: Option<String>,
    pub resolution: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub filesize: Option<u64>,
    pub protocol: Option<String>, // Transport hint, set for the original file only
}

impl Format {
    pub fn is_original(&self) -> bool {
        self.format_id == ORIGINAL_FORMAT_ID
    }
}

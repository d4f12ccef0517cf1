//! Extractor configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extractor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Host serving both the metadata page and the download endpoint
    pub base_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Number of bytes requested when probing the download endpoint
    pub probe_bytes: u64,

    /// Fail when fmt_stream_map and fmt_list differ in length instead of truncating
    pub strict_format_pairing: bool,

    /// Preferred video quality
    pub quality: VideoQuality,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            base_url: "https://docs.google.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 30,
            probe_bytes: 16,
            strict_format_pairing: false,
            quality: VideoQuality::Best,
        }
    }
}

impl ExtractorSettings {
    /// Default settings file: `<config_dir>/driveloader/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("driveloader").join("settings.json"))
    }

    /// Load settings from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Self =
            serde_json::from_str(&json).context("Failed to deserialize settings")?;
        Ok(settings.validate())
    }

    /// Load from `path` if it exists, otherwise return defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                debug!("Loading settings from {:?}", path);
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Enforce sane minimums
    pub fn validate(mut self) -> Self {
        if self.probe_bytes == 0 {
            self.probe_bytes = 1;
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = 1;
        }
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        self
    }
}

/// Video quality options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoQuality {
    Best,
    Worst,
    Specific(String), // Format ID
}

impl VideoQuality {
    /// Get string representation for display
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoQuality::Best => "Best Available",
            VideoQuality::Worst => "Worst Available",
            VideoQuality::Specific(_) => "Custom",
        }
    }

    /// Parse a CLI value: `best`, `worst`, or a format id
    pub fn from_arg(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "best" => VideoQuality::Best,
            "worst" => VideoQuality::Worst,
            _ => VideoQuality::Specific(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExtractorSettings::default();
        assert_eq!(config.probe_bytes, 16);
        assert!(config.timeout_secs > 0);
        assert!(!config.strict_format_pairing);
        assert_eq!(config.quality, VideoQuality::Best);
    }

    #[test]
    fn test_validate_enforces_minimums() {
        let config = ExtractorSettings {
            probe_bytes: 0,
            timeout_secs: 0,
            base_url: "https://docs.example//".to_string(),
            ..Default::default()
        }
        .validate();

        assert_eq!(config.probe_bytes, 1);
        assert_eq!(config.timeout_secs, 1);
        assert_eq!(config.base_url, "https://docs.example");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"base_url": "http://127.0.0.1:9000/", "strict_format_pairing": true}}"#)
            .expect("write settings");

        let config = ExtractorSettings::load(file.path()).expect("load settings");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert!(config.strict_format_pairing);
        assert_eq!(config.probe_bytes, 16);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config =
            ExtractorSettings::load_or_default(Some(dir.path().join("nope.json").as_path())).unwrap();
        assert_eq!(config.base_url, "https://docs.google.com");
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write settings");
        assert!(ExtractorSettings::load(file.path()).is_err());
    }

    #[test]
    fn test_quality_from_arg() {
        assert_eq!(VideoQuality::from_arg("BEST"), VideoQuality::Best);
        assert_eq!(VideoQuality::from_arg("worst"), VideoQuality::Worst);
        assert_eq!(
            VideoQuality::from_arg("Original"),
            VideoQuality::Specific("Original".to_string())
        );
    }
}

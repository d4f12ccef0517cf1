//! Recognising Google Drive links and embeds

use crate::utils::error::DriveError;
use once_cell::sync::Lazy;
use regex::Regex;

static VALID_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:(?:docs|drive)\.google\.com/(?:uc\?.*?id=|file/d/)|video\.google\.com/get_player\?.*?docid=)(?P<id>[a-zA-Z0-9_-]{28,})",
    )
    .expect("valid url regex")
});

static EMBED_IFRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<iframe[^>]+src="https?://(?:video\.google\.com/get_player\?.*?docid=|(?:docs|drive)\.google\.com/file/d/)(?P<id>[a-zA-Z0-9_-]{28,})"#,
    )
    .expect("embed iframe regex")
});

/// True if the URL points at a Drive file or the legacy video player
pub fn is_supported(url: &str) -> bool {
    VALID_URL.is_match(url)
}

/// Pull the file identifier out of a supported URL
pub fn extract_id(url: &str) -> Result<String, DriveError> {
    VALID_URL
        .captures(url)
        .and_then(|caps| caps.name("id"))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| DriveError::InvalidUrl(url.to_string()))
}

/// Canonical file URL for an identifier
pub fn canonical_url(id: &str) -> String {
    format!("https://drive.google.com/file/d/{}", id)
}

/// Scan third-party markup for an embedded Drive player and return its canonical URL
pub fn find_embedded_reference(page_html: &str) -> Option<String> {
    EMBED_IFRAME
        .captures(page_html)
        .and_then(|caps| caps.name("id"))
        .map(|m| canonical_url(m.as_str()))
}

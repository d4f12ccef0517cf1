//! Direct download resolution
//!
//! The download endpoint answers with one of three things: the file itself,
//! a "can't virus-scan this" interstitial carrying a confirm token, or a
//! permission page. Only the real file honours Range requests, so a probe for
//! the first few bytes is enough to tell them apart without pulling a large
//! payload.

use crate::extractor::gdrive::parser::MetadataParser;
use crate::extractor::models::{Format, ORIGINAL_FORMAT_ID};
use crate::http::{PageFetcher, PageRequest};
use crate::utils::error::FetchError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

static CONFIRM_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"confirm=([^&"]+)"#).expect("confirm token regex"));

/// Outcome of probing the download endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The endpoint serves the file directly
    Binary(String),
    /// An interstitial handed out a confirm token; the URL carries it
    Confirmed(String),
    /// Gated with no recoverable token. Not an error: the original is just omitted.
    Unavailable,
}

impl Resolution {
    pub fn url(&self) -> Option<&str> {
        match self {
            Resolution::Binary(url) | Resolution::Confirmed(url) => Some(url.as_str()),
            Resolution::Unavailable => None,
        }
    }
}

/// Probes `<base>/uc?export=download` and derives the final download URL
pub struct DownloadResolver<'a> {
    fetcher: &'a dyn PageFetcher,
    base_url: &'a str,
    probe_bytes: u64,
}

impl<'a> DownloadResolver<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, base_url: &'a str, probe_bytes: u64) -> Self {
        Self {
            fetcher,
            base_url,
            probe_bytes,
        }
    }

    pub fn download_url(&self, id: &str) -> String {
        format!("{}/uc?export=download&id={}", self.base_url, id)
    }

    pub fn confirmed_url(&self, id: &str, token: &str) -> String {
        format!(
            "{}/uc?export=download&confirm={}&id={}",
            self.base_url, token, id
        )
    }

    /// Fetch the first bytes of the endpoint and classify the response.
    /// Transport and HTTP failures are propagated; a gated file is `Unavailable`.
    pub async fn resolve(&self, id: &str) -> Result<Resolution, FetchError> {
        let url = self.download_url(id);
        let request = PageRequest::new(url).first_bytes(self.probe_bytes);
        let body = self.fetcher.fetch(&request).await?;
        Ok(self.classify(id, &body))
    }

    /// Decide what a probe body means
    pub fn classify(&self, id: &str, body: &str) -> Resolution {
        if !body.contains("html") {
            debug!("Download endpoint for {} serves the file directly", id);
            return Resolution::Binary(self.download_url(id));
        }

        match confirm_token(body) {
            Some(token) => {
                info!("Download of {} needs confirmation, using token {}", id, token);
                Resolution::Confirmed(self.confirmed_url(id, token))
            }
            None => {
                warn!("Download endpoint for {} is gated with no confirm token", id);
                Resolution::Unavailable
            }
        }
    }
}

/// `confirm=<token>` from an interstitial page
pub fn confirm_token(body: &str) -> Option<&str> {
    CONFIRM_TOKEN
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The "Original" entry for a resolved download, enriched with the trailing
/// extension/size fields of the metadata page when they are present.
pub fn original_format(resolution: &Resolution, metadata: &MetadataParser<'_>) -> Option<Format> {
    let url = resolution.url()?;
    Some(Format {
        format_id: ORIGINAL_FORMAT_ID.to_string(),
        url: url.to_string(),
        ext: metadata.original_extension(),
        filesize: metadata.original_size(),
        protocol: Some("https".to_string()),
        ..Default::default()
    })
}

use crate::extractor::models::{Format, VideoInfo};
use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Core trait for all media extractors
///
/// This trait isolates callers from the specific provider being scraped.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g., "google-drive")
    fn id(&self) -> &'static str;

    /// Checks if this extractor can handle the given URL
    fn supports(&self, url: &str) -> bool;

    /// Extracts media information
    async fn extract_info(&self, url: &str) -> Result<VideoInfo>;

    /// Gets available formats (calls extract_info internally)
    async fn get_formats(&self, url: &str) -> Result<Vec<Format>> {
        let info = self.extract_info(url).await?;
        Ok(info.formats)
    }

    /// Resolves the direct download URL for a specific format
    async fn get_direct_url(&self, url: &str, format_id: &str) -> Result<String> {
        let info = self.extract_info(url).await?;
        info.format(format_id)
            .map(|f| f.url.clone())
            .ok_or_else(|| anyhow!("Format {} not available from {}", format_id, self.id()))
    }
}

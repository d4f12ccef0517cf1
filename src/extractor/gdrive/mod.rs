//! Google Drive extractor
//!
//! One extraction is two fetches: the file page (`/file/d/<id>`) that carries
//! title, duration and the transcoded stream maps, and a ranged probe of the
//! download endpoint that decides whether the original upload is reachable.
//! The two are independent until assembly, so they run concurrently.

pub mod parser;
pub mod resolver;
pub mod url;

use crate::extractor::models::VideoInfo;
use crate::extractor::traits::Extractor;
use crate::http::{HttpFetcher, PageFetcher, PageRequest};
use crate::utils::config::ExtractorSettings;
use crate::utils::error::DriveError;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

pub use parser::MetadataParser;
pub use resolver::{DownloadResolver, Resolution};
pub use url::find_embedded_reference;

pub struct GoogleDriveExtractor {
    fetcher: Arc<dyn PageFetcher>,
    settings: ExtractorSettings,
}

impl GoogleDriveExtractor {
    /// Create an extractor backed by a real HTTP client
    pub fn new(settings: ExtractorSettings) -> Result<Self, DriveError> {
        let fetcher = HttpFetcher::new(&settings)?;
        Ok(Self::with_fetcher(Arc::new(fetcher), settings))
    }

    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>, settings: ExtractorSettings) -> Self {
        Self {
            fetcher,
            settings: settings.validate(),
        }
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    pub fn metadata_url(&self, id: &str) -> String {
        format!("{}/file/d/{}", self.settings.base_url, id)
    }

    fn resolver(&self) -> DownloadResolver<'_> {
        DownloadResolver::new(
            self.fetcher.as_ref(),
            &self.settings.base_url,
            self.settings.probe_bytes,
        )
    }

    /// Extract from any supported Drive URL
    pub async fn extract(&self, url: &str) -> Result<VideoInfo, DriveError> {
        let id = url::extract_id(url)?;
        self.extract_id(&id).await
    }

    /// Extract by file identifier.
    ///
    /// Fatal errors abort with no partial result. A provider-reported reason
    /// wins over everything else, including a failed download probe.
    pub async fn extract_id(&self, id: &str) -> Result<VideoInfo, DriveError> {
        debug!("Extracting Drive file {}", id);

        let page_request = PageRequest::new(self.metadata_url(id));
        let resolver = self.resolver();
        let (page, resolution) =
            tokio::join!(self.fetcher.fetch(&page_request), resolver.resolve(id));

        let page = page?;
        let metadata = MetadataParser::new(&page);
        metadata.check_error_reason()?;

        let title = metadata.title()?;
        let duration = metadata.duration();
        let mut formats = metadata.formats(self.settings.strict_format_pairing)?;

        match resolver::original_format(&resolution?, &metadata) {
            Some(original) => {
                info!("Original file of {} is downloadable", id);
                formats.push(original);
            }
            None => debug!("Continuing without the original file for {}", id),
        }

        Ok(VideoInfo {
            id: id.to_string(),
            title,
            url: url::canonical_url(id),
            duration,
            thumbnail: metadata.thumbnail(),
            formats,
            extractor: Some(self.id().to_string()),
        })
    }
}

#[async_trait]
impl Extractor for GoogleDriveExtractor {
    fn id(&self) -> &'static str {
        "google-drive"
    }

    fn supports(&self, url: &str) -> bool {
        url::is_supported(url)
    }

    async fn extract_info(&self, url: &str) -> Result<VideoInfo> {
        info!("GoogleDriveExtractor invoked for: {}", url);
        Ok(self.extract(url).await?)
    }
}

//! Error handling for Driveloader

use thiserror::Error;

/// Failure while fetching a page or probing an endpoint
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} while fetching {url}")]
    Status { url: String, status: u16 },
}

/// Fatal extraction errors. Any of these aborts the whole extraction.
#[derive(Debug, Error)]
pub enum DriveError {
    /// The provider said why the file can't be served (removed, access revoked, ...)
    #[error("{0}")]
    ProviderReported(String),

    #[error("Unable to extract {field} from metadata page")]
    MalformedPage { field: &'static str },

    #[error("Unknown format id: {0}")]
    UnknownFormat(String),

    #[error("fmt_stream_map has {streams} entries but fmt_list has {descriptors}")]
    FormatListMismatch { streams: usize, descriptors: usize },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl DriveError {
    /// True when the provider itself rejected the request
    pub fn is_provider_reported(&self) -> bool {
        matches!(self, DriveError::ProviderReported(_))
    }
}

//! Driveloader library

pub mod extractor;
pub mod http;
pub mod utils;

// Re-export main types for easier use
pub use extractor::{Extractor, Format, GoogleDriveExtractor, VideoInfo};
pub use http::{HttpFetcher, PageFetcher, PageRequest};
pub use utils::{DriveError, ExtractorSettings, FetchError, VideoQuality};

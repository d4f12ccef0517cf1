//! Utility modules for error handling, configuration and text decoding

pub mod config;
pub mod error;
pub mod text;

// Re-export for convenience
pub use config::{ExtractorSettings, VideoQuality};
pub use error::{DriveError, FetchError};
pub use text::decode_unicode_escape;

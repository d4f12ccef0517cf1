pub mod gdrive;
pub mod models;
pub mod selection;
pub mod traits;

pub use gdrive::GoogleDriveExtractor;
pub use models::{Format, VideoInfo, ORIGINAL_FORMAT_ID};
pub use selection::{select_format, sort_formats};
pub use traits::Extractor;

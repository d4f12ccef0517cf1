//! Caller-side format choice

use crate::extractor::models::Format;
use crate::utils::config::VideoQuality;
use std::cmp::Ordering;

fn stream_rank(format: &Format) -> (u32, u32) {
    (format.height.unwrap_or(0), format.width.unwrap_or(0))
}

/// Ascending quality for display: streams by (height, width), the original file last
pub fn sort_formats(formats: &mut [Format]) {
    formats.sort_by(|a, b| match (a.is_original(), b.is_original()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => stream_rank(a).cmp(&stream_rank(b)),
    });
}

/// Pick one format according to the preferred quality.
///
/// `Best` favours the untouched original upload, then the largest stream.
/// `Worst` takes the smallest stream and only falls back to the original.
pub fn select_format<'a>(formats: &'a [Format], quality: &VideoQuality) -> Option<&'a Format> {
    let original = formats.iter().find(|f| f.is_original());
    let mut streams = formats.iter().filter(|f| !f.is_original());

    match quality {
        VideoQuality::Specific(id) => formats.iter().find(|f| &f.format_id == id),
        VideoQuality::Best => original.or_else(|| streams.max_by_key(|f| stream_rank(f))),
        VideoQuality::Worst => streams.min_by_key(|f| stream_rank(f)).or(original),
    }
}

//! Metadata page parsing
//!
//! The file page embeds its player config as `["name","value"]` pairs inside a
//! script blob. There is no stable API behind it, so every field gets its own
//! accessor and its own failure mode: a provider-side change should break one
//! field, not the whole parse.

use crate::extractor::models::Format;
use crate::utils::error::DriveError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Provider stream tags and their container
pub const FORMAT_EXTENSIONS: &[(&str, &str)] = &[
    ("5", "flv"),
    ("6", "flv"),
    ("13", "3gp"),
    ("17", "3gp"),
    ("18", "mp4"),
    ("22", "mp4"),
    ("34", "flv"),
    ("35", "flv"),
    ("36", "3gp"),
    ("37", "mp4"),
    ("38", "mp4"),
    ("43", "webm"),
    ("44", "webm"),
    ("45", "webm"),
    ("46", "webm"),
    ("59", "mp4"),
];

static REASON: Lazy<Regex> = Lazy::new(|| field_regex("reason"));
static TITLE: Lazy<Regex> = Lazy::new(|| field_regex("title"));
static LENGTH_SECONDS: Lazy<Regex> = Lazy::new(|| field_regex("length_seconds"));
static FMT_STREAM_MAP: Lazy<Regex> = Lazy::new(|| field_regex("fmt_stream_map"));
static FMT_LIST: Lazy<Regex> = Lazy::new(|| field_regex("fmt_list"));

// Both anchored to the end of the page
static ORIGINAL_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)",[^,]*,[^,]*$"#).expect("original extension regex"));
static ORIGINAL_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"]+)"[^"]*\n[^\n]*,[^,]*$"#).expect("original size regex")
});

static OG_IMAGE: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r#"<meta[^>]+(?:property|name)=["']og:image["'][^>]*?content=["']([^"']+)["']"#)
            .expect("og:image regex"),
        Regex::new(r#"<meta[^>]+content=["']([^"']+)["'][^>]*?(?:property|name)=["']og:image["']"#)
            .expect("og:image reversed regex"),
    ]
});

fn field_regex(name: &str) -> Regex {
    Regex::new(&format!(r#""{}"\s*,\s*"([^"]+)"#, regex::escape(name)))
        .expect("field regex")
}

/// Container for a provider format id
pub fn extension_for(format_id: &str) -> Option<&'static str> {
    FORMAT_EXTENSIONS
        .iter()
        .find(|(id, _)| *id == format_id)
        .map(|(_, ext)| *ext)
}

/// Split `WxH` into width and height. Each side is independently optional.
pub fn parse_resolution(resolution: &str) -> (Option<u32>, Option<u32>) {
    match resolution.split_once('x') {
        Some((w, h)) => (w.trim().parse().ok(), h.trim().parse().ok()),
        None => (None, None),
    }
}

/// Field accessors over one decoded metadata page
pub struct MetadataParser<'a> {
    document: &'a str,
}

impl<'a> MetadataParser<'a> {
    pub fn new(document: &'a str) -> Self {
        Self { document }
    }

    fn search(&self, re: &Regex) -> Option<&'a str> {
        re.captures(self.document)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    fn require(&self, re: &Regex, field: &'static str) -> Result<&'a str, DriveError> {
        self.search(re).ok_or(DriveError::MalformedPage { field })
    }

    /// Page with a trailing newline stripped, for the end-anchored patterns
    fn tail(&self) -> &'a str {
        self.document
            .strip_suffix('\n')
            .unwrap_or(self.document)
    }

    /// Reason the provider gives for refusing the file, if any
    pub fn error_reason(&self) -> Option<&'a str> {
        self.search(&REASON)
    }

    /// Fails with the provider's message when the page carries a reason field.
    /// Nothing else on such a page can be trusted.
    pub fn check_error_reason(&self) -> Result<(), DriveError> {
        match self.error_reason() {
            Some(reason) => Err(DriveError::ProviderReported(reason.to_string())),
            None => Ok(()),
        }
    }

    pub fn title(&self) -> Result<String, DriveError> {
        self.require(&TITLE, "title").map(str::to_string)
    }

    pub fn duration(&self) -> Option<u64> {
        self.search(&LENGTH_SECONDS)
            .and_then(|secs| secs.trim().parse().ok())
    }

    /// Transcoded stream variants, in page order.
    ///
    /// `fmt_stream_map` and `fmt_list` are paired by position. When their lengths
    /// differ the pairing is truncated to the shorter list, or rejected in strict mode.
    pub fn formats(&self, strict_pairing: bool) -> Result<Vec<Format>, DriveError> {
        let streams: Vec<&str> = self
            .require(&FMT_STREAM_MAP, "fmt_stream_map")?
            .split(',')
            .collect();
        let descriptors: Vec<&str> = self.require(&FMT_LIST, "fmt_list")?.split(',').collect();

        if streams.len() != descriptors.len() {
            if strict_pairing {
                return Err(DriveError::FormatListMismatch {
                    streams: streams.len(),
                    descriptors: descriptors.len(),
                });
            }
            warn!(
                "fmt_stream_map has {} entries but fmt_list has {}, pairing the first {}",
                streams.len(),
                descriptors.len(),
                streams.len().min(descriptors.len())
            );
        }

        let mut seen = HashSet::new();
        let mut formats = Vec::with_capacity(streams.len().min(descriptors.len()));

        for (stream, descriptor) in streams.iter().zip(&descriptors) {
            let (format_id, url) = stream
                .split_once('|')
                .ok_or(DriveError::MalformedPage {
                    field: "fmt_stream_map",
                })?;

            let ext = extension_for(format_id)
                .ok_or_else(|| DriveError::UnknownFormat(format_id.to_string()))?;

            if !seen.insert(format_id) {
                warn!("Duplicate format id {} in fmt_stream_map, keeping the first", format_id);
                continue;
            }

            let resolution = descriptor.split('/').nth(1);
            let (width, height) = match resolution {
                Some(res) => parse_resolution(res),
                None => {
                    warn!("fmt_list entry {:?} has no resolution", descriptor);
                    (None, None)
                }
            };

            formats.push(Format {
                format_id: format_id.to_string(),
                url: url.to_string(),
                ext: Some(ext.to_string()),
                resolution: resolution.map(str::to_string),
                width,
                height,
                ..Default::default()
            });
        }

        debug!("Parsed {} stream formats", formats.len());
        Ok(formats)
    }

    /// Extension of the uploaded file, read from the end of the page
    pub fn original_extension(&self) -> Option<String> {
        ORIGINAL_EXTENSION
            .captures(self.tail())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Size in bytes of the uploaded file, read from the end of the page
    pub fn original_size(&self) -> Option<u64> {
        ORIGINAL_SIZE
            .captures(self.tail())
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().trim().parse().ok())
    }

    pub fn thumbnail(&self) -> Option<String> {
        OG_IMAGE.iter().find_map(|re| {
            re.captures(self.document)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(fields: &str) -> String {
        format!(
            "<html><head><meta property=\"og:image\" content=\"https://lh3.example/thumb\"></head>\n\
             <script>_initProjector([{}]);\n\
             ,\"5331627\"\n\
             ,\"mp4\",null,0]\n",
            fields
        )
    }

    fn bunny() -> String {
        page(
            r#"["title","Big Buck Bunny.mp4"],["length_seconds","45"],["fmt_stream_map","37|https://example/stream37,18|https://example/stream18"],["fmt_list","37/1280x720/9/0/115,18/640x360/9/0/115"]"#,
        )
    }

    #[test]
    fn test_title_and_duration() {
        let doc = bunny();
        let parser = MetadataParser::new(&doc);
        assert_eq!(parser.title().unwrap(), "Big Buck Bunny.mp4");
        assert_eq!(parser.duration(), Some(45));
        assert!(parser.check_error_reason().is_ok());
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let doc = page(r#"["length_seconds","45"]"#);
        let err = MetadataParser::new(&doc).title().unwrap_err();
        assert!(matches!(err, DriveError::MalformedPage { field: "title" }));
    }

    #[test]
    fn test_missing_or_bad_duration_is_none() {
        let doc = page(r#"["title","x"]"#);
        assert_eq!(MetadataParser::new(&doc).duration(), None);

        let doc = page(r#"["title","x"],["length_seconds","soon"]"#);
        assert_eq!(MetadataParser::new(&doc).duration(), None);
    }

    #[test]
    fn test_reason_reported_verbatim() {
        let doc = page(r#"["reason","File removed"],["title","x"]"#);
        let parser = MetadataParser::new(&doc);
        assert_eq!(parser.error_reason(), Some("File removed"));
        match parser.check_error_reason() {
            Err(DriveError::ProviderReported(msg)) => assert_eq!(msg, "File removed"),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_formats_in_page_order() {
        let doc = bunny();
        let formats = MetadataParser::new(&doc).formats(false).unwrap();
        assert_eq!(formats.len(), 2);

        assert_eq!(formats[0].format_id, "37");
        assert_eq!(formats[0].url, "https://example/stream37");
        assert_eq!(formats[0].ext.as_deref(), Some("mp4"));
        assert_eq!(formats[0].resolution.as_deref(), Some("1280x720"));
        assert_eq!((formats[0].width, formats[0].height), (Some(1280), Some(720)));
        assert_eq!(formats[0].filesize, None);
        assert_eq!(formats[0].protocol, None);

        assert_eq!(formats[1].format_id, "18");
        assert_eq!((formats[1].width, formats[1].height), (Some(640), Some(360)));
    }

    #[test]
    fn test_unknown_format_id() {
        let doc = page(
            r#"["title","x"],["fmt_stream_map","999|https://example/s"],["fmt_list","999/1x1/9"]"#,
        );
        match MetadataParser::new(&doc).formats(false) {
            Err(DriveError::UnknownFormat(id)) => assert_eq!(id, "999"),
            other => panic!("expected unknown format, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_format_fields() {
        let doc = page(r#"["title","x"],["fmt_list","37/1280x720/9"]"#);
        assert!(matches!(
            MetadataParser::new(&doc).formats(false),
            Err(DriveError::MalformedPage { field: "fmt_stream_map" })
        ));

        let doc = page(r#"["title","x"],["fmt_stream_map","37|https://example/s"]"#);
        assert!(matches!(
            MetadataParser::new(&doc).formats(false),
            Err(DriveError::MalformedPage { field: "fmt_list" })
        ));
    }

    #[test]
    fn test_length_mismatch_truncates_or_fails() {
        let doc = page(
            r#"["title","x"],["fmt_stream_map","37|https://example/a,22|https://example/b"],["fmt_list","37/1280x720/9"]"#,
        );
        let parser = MetadataParser::new(&doc);

        let formats = parser.formats(false).unwrap();
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].format_id, "37");

        assert!(matches!(
            parser.formats(true),
            Err(DriveError::FormatListMismatch { streams: 2, descriptors: 1 })
        ));
    }

    #[test]
    fn test_duplicate_format_ids_keep_first() {
        let doc = page(
            r#"["title","x"],["fmt_stream_map","22|https://example/a,22|https://example/b"],["fmt_list","22/1280x720/9,22/1280x720/9"]"#,
        );
        let formats = MetadataParser::new(&doc).formats(false).unwrap();
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].url, "https://example/a");
    }

    #[test]
    fn test_malformed_resolution_is_not_fatal() {
        let doc = page(
            r#"["title","x"],["fmt_stream_map","18|https://example/a,43|https://example/b"],["fmt_list","18/640by360/9,43"]"#,
        );
        let formats = MetadataParser::new(&doc).formats(false).unwrap();
        assert_eq!(formats.len(), 2);
        assert_eq!((formats[0].width, formats[0].height), (None, None));
        assert_eq!(formats[0].resolution.as_deref(), Some("640by360"));
        assert_eq!(formats[1].resolution, None);
        assert_eq!(formats[1].ext.as_deref(), Some("webm"));
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("1280x720"), (Some(1280), Some(720)));
        assert_eq!(parse_resolution("1280720"), (None, None));
        assert_eq!(parse_resolution("autox720"), (None, Some(720)));
    }

    #[test]
    fn test_extension_table() {
        assert_eq!(extension_for("5"), Some("flv"));
        assert_eq!(extension_for("17"), Some("3gp"));
        assert_eq!(extension_for("45"), Some("webm"));
        assert_eq!(extension_for("59"), Some("mp4"));
        assert_eq!(extension_for("Original"), None);
        assert_eq!(FORMAT_EXTENSIONS.len(), 16);
    }

    #[test]
    fn test_trailing_original_fields() {
        let doc = bunny();
        let parser = MetadataParser::new(&doc);
        assert_eq!(parser.original_extension().as_deref(), Some("mp4"));
        assert_eq!(parser.original_size(), Some(5_331_627));
    }

    #[test]
    fn test_trailing_fields_absent() {
        let parser = MetadataParser::new("[\"title\",\"x\"]");
        assert_eq!(parser.original_extension(), None);
        assert_eq!(parser.original_size(), None);
    }

    #[test]
    fn test_thumbnail_either_attribute_order() {
        let doc = bunny();
        assert_eq!(
            MetadataParser::new(&doc).thumbnail().as_deref(),
            Some("https://lh3.example/thumb")
        );

        let reversed = r#"<meta content="https://lh3.example/other" property="og:image">"#;
        assert_eq!(
            MetadataParser::new(reversed).thumbnail().as_deref(),
            Some("https://lh3.example/other")
        );
        assert_eq!(MetadataParser::new("<html></html>").thumbnail(), None);
    }
}

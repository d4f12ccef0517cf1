//! Driveloader - Google Drive media extractor
//!
//! Resolves a Drive file link into its title, duration and downloadable
//! formats, including the original upload when the provider lets it through.

use anyhow::{bail, Context, Result};
use clap::Parser;
use driveloader::extractor::{self, gdrive, Extractor, GoogleDriveExtractor};
use driveloader::utils::{ExtractorSettings, VideoQuality};
use driveloader::VideoInfo;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "driveloader", version, about)]
struct Args {
    /// Drive file URL (drive.google.com/file/d/<id>, docs.google.com/uc?id=<id>, ...)
    url: Option<String>,

    /// Format to select: best, worst, or a format id such as 37 or Original
    #[arg(short, long)]
    format: Option<String>,

    /// Print the full extraction result as JSON
    #[arg(long)]
    json: bool,

    /// Find an embedded Drive player in a saved HTML page instead of extracting
    #[arg(long, value_name = "HTML_FILE")]
    scan_embedded: Option<PathBuf>,

    /// Override the provider host
    #[arg(long)]
    base_url: Option<String>,

    /// Settings file (defaults to <config dir>/driveloader/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = args.scan_embedded {
        return scan_embedded(&path);
    }

    let Some(url) = args.url else {
        bail!("A Drive URL is required (or use --scan-embedded)");
    };

    let config_path = args.config.or_else(ExtractorSettings::default_path);
    let mut settings = ExtractorSettings::load_or_default(config_path.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(format) = args.format.as_deref() {
        settings.quality = VideoQuality::from_arg(format);
    }

    let extractor = GoogleDriveExtractor::new(settings)?;
    if !extractor.supports(&url) {
        bail!("Not a Google Drive file URL: {}", url);
    }

    let info = extractor.extract_info(&url).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    print_summary(&info, &extractor.settings().quality)
}

fn scan_embedded(path: &Path) -> Result<()> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match gdrive::find_embedded_reference(&html) {
        Some(url) => {
            println!("{}", url);
            Ok(())
        }
        None => bail!("No embedded Drive player found in {}", path.display()),
    }
}

fn print_summary(info: &VideoInfo, quality: &VideoQuality) -> Result<()> {
    println!("ID:        {}", info.id);
    println!("Title:     {}", info.title);
    if let Some(duration) = info.duration {
        println!("Duration:  {}:{:02}", duration / 60, duration % 60);
    }
    if let Some(thumbnail) = &info.thumbnail {
        println!("Thumbnail: {}", thumbnail);
    }

    let mut formats = info.formats.clone();
    extractor::sort_formats(&mut formats);

    println!();
    println!("{:<10} {:<6} {:<12} {:>12}", "FORMAT", "EXT", "RESOLUTION", "SIZE");
    for format in &formats {
        println!(
            "{:<10} {:<6} {:<12} {:>12}",
            format.format_id,
            format.ext.as_deref().unwrap_or("?"),
            format.resolution.as_deref().unwrap_or("original"),
            format
                .filesize
                .map(|size| size.to_string())
                .unwrap_or_default(),
        );
    }

    let selected = extractor::select_format(&formats, quality)
        .with_context(|| format!("No format matches {:?}", quality))?;
    println!();
    println!("Selected ({}): {}", quality.as_str(), selected.format_id);
    println!("{}", selected.url);
    Ok(())
}

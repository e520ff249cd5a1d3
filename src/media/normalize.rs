use super::{
    error::MediaError,
    types::{DownloadOption, VideoInfo},
};
use serde_json::Value;
use tracing::debug;

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_PLATFORM: &str = "Unknown";
const UNKNOWN_QUALITY: &str = "Unknown";
const DEFAULT_QUALITY: &str = "Default";

/// Parses raw extractor output and normalizes it into a [`VideoInfo`].
///
/// Only fails when the text is not a JSON object at all. Sparse documents
/// degrade to defaults.
pub fn normalize(raw: &str, original_url: &str) -> Result<VideoInfo, MediaError> {
    let json: Value = serde_json::from_str(raw.trim())?;

    if !json.is_object() {
        return Err(MediaError::MalformedMetadata(
            "expected a JSON object at the document root".to_string(),
        ));
    }

    Ok(normalize_document(&json, original_url))
}

/// Builds a [`VideoInfo`] from an already-parsed metadata document.
pub fn normalize_document(json: &Value, original_url: &str) -> VideoInfo {
    let title = str_field(json, "title").unwrap_or(UNKNOWN_TITLE).to_string();
    let thumbnail_url = str_field(json, "thumbnail").unwrap_or_default().to_string();
    let platform = str_field(json, "extractor_key")
        .or_else(|| str_field(json, "extractor"))
        .unwrap_or(UNKNOWN_PLATFORM)
        .to_string();

    let mut download_options: Vec<DownloadOption> = json["formats"]
        .as_array()
        .map(|formats| formats.iter().filter_map(admit_format).collect())
        .unwrap_or_default();

    // Some extractors hand back a single direct URL instead of a formats list
    if download_options.is_empty() {
        if let Some(url) = non_empty_str_field(json, "url") {
            download_options.push(DownloadOption::video(DEFAULT_QUALITY, url));
        }
    }

    debug!(
        "Normalized metadata for {}: {} option(s) from {}",
        original_url,
        download_options.len(),
        platform
    );

    VideoInfo {
        title,
        thumbnail_url,
        platform,
        download_options,
    }
}

/// Only containers a browser or ffmpeg can consume directly are exposed.
fn admit_format(format: &Value) -> Option<DownloadOption> {
    let url = non_empty_str_field(format, "url")?;
    let ext = str_field(format, "ext").unwrap_or_default();

    if ext.eq_ignore_ascii_case("mp4") {
        let quality = resolution_of(format).unwrap_or_else(|| UNKNOWN_QUALITY.to_string());
        Some(DownloadOption::video(quality, url))
    } else if ext.eq_ignore_ascii_case("m4a") || ext.eq_ignore_ascii_case("mp3") {
        Some(DownloadOption::audio(url))
    } else {
        None
    }
}

fn resolution_of(format: &Value) -> Option<String> {
    if let Some(resolution) = non_empty_str_field(format, "resolution") {
        return Some(resolution.to_string());
    }

    match (format["width"].as_u64(), format["height"].as_u64()) {
        (Some(width), Some(height)) => Some(format!("{width}x{height}")),
        _ => None,
    }
}

fn str_field<'a>(json: &'a Value, key: &str) -> Option<&'a str> {
    json[key].as_str()
}

fn non_empty_str_field<'a>(json: &'a Value, key: &str) -> Option<&'a str> {
    str_field(json, key).filter(|s| !s.is_empty())
}

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    // The second group is used as the height. Correct for the portrait
    // content the supported platforms serve; inverted for landscape.
    static ref RESOLUTION_RE: Regex = Regex::new(r"(\d+)x(\d+)").unwrap();
    static ref HEIGHT_LABEL_RE: Regex = Regex::new(r"^(\d+)[pP]$").unwrap();
}

const BEST_SELECTOR: &str = "best[ext=mp4]/best";

/// A yt-dlp `-f` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelector(String);

impl FormatSelector {
    /// Best progressive mp4, else best overall.
    pub fn best() -> Self {
        Self(BEST_SELECTOR.to_string())
    }

    /// Best mp4 video no taller than `height` plus best audio, then best mp4, then best.
    pub fn max_height(height: u32) -> Self {
        Self(format!(
            "bestvideo[height<={height}][ext=mp4]+bestaudio/best[ext=mp4]/best"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display label for a resolution string, e.g. `"1080x1920"` -> `"1920p"`.
pub fn display_label(resolution: &str) -> Option<String> {
    RESOLUTION_RE
        .captures(resolution)
        .map(|caps| format!("{}p", &caps[2]))
}

/// Resolves a quality label to a format selector. Never fails: anything
/// unrecognized falls back to the best-available selector.
///
/// Accepts raw resolution tokens (`"1080x1920"`) and the display labels
/// derived from them (`"1920p"`). Tokens go through [`display_label`] first so
/// both spellings of the same option resolve identically.
pub fn to_format_selector(label: Option<&str>) -> FormatSelector {
    let label = match label.map(str::trim) {
        Some(label) if !label.is_empty() && !label.eq_ignore_ascii_case("best") => label,
        _ => return FormatSelector::best(),
    };

    let height_label = display_label(label).unwrap_or_else(|| label.to_string());

    match label_height(&height_label) {
        Some(height) => FormatSelector::max_height(height),
        None => FormatSelector::best(),
    }
}

fn label_height(label: &str) -> Option<u32> {
    HEIGHT_LABEL_RE
        .captures(label)
        .and_then(|caps| caps[1].parse().ok())
}

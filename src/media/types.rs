use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// One user-facing media variant. `url` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOption {
    pub quality: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

impl DownloadOption {
    pub fn video(quality: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            quality: quality.into(),
            url: url.into(),
            kind: MediaKind::Video,
        }
    }

    pub fn audio(url: impl Into<String>) -> Self {
        Self {
            quality: "Audio".to_string(),
            url: url.into(),
            kind: MediaKind::Audio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub title: String,
    pub thumbnail_url: String,
    pub platform: String,
    pub download_options: Vec<DownloadOption>,
}

/// A fully materialized download, held in memory once the scratch file is gone.
#[derive(Debug)]
pub struct DownloadedMedia {
    pub filename: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

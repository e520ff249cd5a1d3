use super::{
    error::MediaError, gateway::ExtractorGateway, quality::FormatSelector, types::DownloadedMedia,
};
use crate::utils::format_size;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::TempDir;
use tracing::{info, warn};

const ARTIFACT_NAME: &str = "video.mp4";

pub struct DownloadOrchestrator {
    gateway: Arc<dyn ExtractorGateway>,
    temp_root: PathBuf,
}

impl DownloadOrchestrator {
    pub fn new(gateway: Arc<dyn ExtractorGateway>, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            gateway,
            temp_root: temp_root.into(),
        }
    }

    /// Downloads `url` into a private scratch directory and returns the file
    /// contents. The scratch directory is removed before returning, on every path.
    pub async fn download(
        &self,
        url: &str,
        selector: &FormatSelector,
    ) -> Result<DownloadedMedia, MediaError> {
        let scratch = tempfile::Builder::new()
            .prefix("clipfetch_")
            .tempdir_in(&self.temp_root)?;

        let result = self.materialize(url, selector, scratch.path()).await;
        release(scratch);
        result
    }

    async fn materialize(
        &self,
        url: &str,
        selector: &FormatSelector,
        scratch: &Path,
    ) -> Result<DownloadedMedia, MediaError> {
        let destination = scratch.join(ARTIFACT_NAME);

        self.gateway
            .fetch_media(url, selector, &destination)
            .await?;

        let artifact = locate_artifact(scratch, &destination).await?;
        let data = tokio::fs::read(&artifact).await?;

        info!(
            "Video downloaded successfully with {} to {} ({})",
            self.gateway.name(),
            artifact.display(),
            format_size(data.len() as u64)
        );

        let extension = artifact
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("mp4")
            .to_ascii_lowercase();

        Ok(DownloadedMedia {
            filename: format!("video.{extension}"),
            content_type: content_type_for(&extension),
            data,
        })
    }
}

/// The expected path, or the single file yt-dlp left behind under another name.
async fn locate_artifact(scratch: &Path, expected: &Path) -> Result<PathBuf, MediaError> {
    if tokio::fs::try_exists(expected).await? {
        return Ok(expected.to_path_buf());
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(scratch).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }

    match files.as_slice() {
        [only] => Ok(only.clone()),
        _ => {
            warn!("Downloaded file not found at path: {}", expected.display());
            Err(MediaError::ArtifactMissing(expected.to_path_buf()))
        }
    }
}

fn release(scratch: TempDir) {
    let path = scratch.path().to_path_buf();
    match scratch.close() {
        Ok(()) => info!("Temporary files deleted: {}", path.display()),
        Err(e) => warn!("Failed to delete temporary files {}: {}", path.display(), e),
    }
}

pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "m4a" => "audio/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

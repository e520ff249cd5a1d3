mod error;
mod gateway;
mod normalize;
mod orchestrator;
mod quality;
mod types;
mod ytdlp;

pub use error::MediaError;
pub use types::{DownloadedMedia, VideoInfo};
pub use ytdlp::{YtDlpGateway, DEFAULT_BINARY};

#[cfg(test)]
pub(crate) use gateway::fake;

use anyhow::Result;
use gateway::ExtractorGateway;
use orchestrator::DownloadOrchestrator;
use quality::to_format_selector;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};
use url::Url;

pub struct MediaService {
    gateway: Arc<dyn ExtractorGateway>,
    orchestrator: DownloadOrchestrator,
}

impl MediaService {
    pub fn new(gateway: Arc<dyn ExtractorGateway>, temp_root: impl Into<PathBuf>) -> Self {
        info!(
            "Media service initialized - using {} with in-memory delivery",
            gateway.name()
        );

        let orchestrator = DownloadOrchestrator::new(gateway.clone(), temp_root);

        Self {
            gateway,
            orchestrator,
        }
    }

    pub async fn video_info(&self, url: &str) -> Result<VideoInfo, MediaError> {
        let url = validate_url(url)?;
        info!("Fetching video info for URL: {}", url);

        let raw = self.gateway.fetch_metadata(url).await?;
        let info = normalize::normalize(&raw, url)?;

        info!(
            "Found {} download option(s) for \"{}\" on {}",
            info.download_options.len(),
            info.title,
            info.platform
        );
        Ok(info)
    }

    pub async fn download(
        &self,
        url: &str,
        quality: Option<&str>,
    ) -> Result<DownloadedMedia, MediaError> {
        let url = validate_url(url)?;
        let selector = to_format_selector(quality);

        info!(
            "Downloading video from URL: {} with quality: {} ({})",
            url,
            quality.unwrap_or("best"),
            selector
        );

        self.orchestrator.download(url, &selector).await
    }

    pub async fn test_setup(&self) -> Result<()> {
        info!("Testing media extractor setup...");

        if self.gateway.test_availability().await {
            info!("✅ {} is available", self.gateway.name());
            Ok(())
        } else {
            warn!("❌ {} is not available", self.gateway.name());
            Err(anyhow::anyhow!(
                "{} is not available. Please install it or set extractor.binary in the config.",
                self.gateway.name()
            ))
        }
    }
}

fn validate_url(url: &str) -> Result<&str, MediaError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(MediaError::InvalidInput("URL cannot be empty".to_string()));
    }

    let parsed =
        Url::parse(url).map_err(|e| MediaError::InvalidInput(format!("Invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(MediaError::InvalidInput(format!(
            "Unsupported URL scheme: {scheme}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{FakeGateway, MediaBehavior};

    const TIKTOK_JSON: &str = r#"{"title":"Cat video","thumbnail":"t.jpg","extractor_key":"TikTok","formats":[{"ext":"mp4","url":"https://x/video.mp4","resolution":"1080x1920"},{"ext":"m4a","url":"https://x/audio.m4a"}]}"#;

    fn service(gateway: &Arc<FakeGateway>) -> (MediaService, tempfile::TempDir) {
        let root = tempfile::tempdir().unwrap();
        (MediaService::new(gateway.clone(), root.path()), root)
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(
            validate_url("  https://vt.tiktok.com/abc ").unwrap(),
            "https://vt.tiktok.com/abc"
        );
        assert!(validate_url("http://example.com").is_ok());

        for bad in ["", "   ", "not a url", "ftp://example.com/file", "file:///etc/passwd"] {
            let err = validate_url(bad).unwrap_err();
            assert!(err.is_client_error(), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_video_info() {
        let gateway = Arc::new(FakeGateway::with_metadata(TIKTOK_JSON));
        let (service, _root) = service(&gateway);

        let info = service
            .video_info("https://www.tiktok.com/@cat/video/1")
            .await
            .unwrap();

        assert_eq!(info.platform, "TikTok");
        assert_eq!(info.download_options.len(), 2);
    }

    #[tokio::test]
    async fn test_video_info_rejects_empty_url_before_extracting() {
        let gateway = Arc::new(FakeGateway::failing_metadata(1, "should not run"));
        let (service, _root) = service(&gateway);

        let err = service.video_info(" ").await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_video_info_extraction_failure() {
        let gateway = Arc::new(FakeGateway::failing_metadata(
            1,
            "ERROR: Unsupported URL: https://example.com",
        ));
        let (service, _root) = service(&gateway);

        let err = service
            .video_info("https://example.com")
            .await
            .unwrap_err();

        assert!(err.detail().contains("Unsupported URL"));
    }

    #[tokio::test]
    async fn test_video_info_malformed_output() {
        let gateway = Arc::new(FakeGateway::with_metadata("WARNING: something\n"));
        let (service, _root) = service(&gateway);

        let err = service
            .video_info("https://example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::MalformedMetadata(_)));
    }

    #[tokio::test]
    async fn test_download_resolves_quality_label() {
        let gateway = Arc::new(FakeGateway::with_media(MediaBehavior::Write(
            b"video".to_vec(),
        )));
        let (service, _root) = service(&gateway);

        service
            .download("https://x/v", Some("1920p"))
            .await
            .unwrap();
        service.download("https://x/v", None).await.unwrap();

        let selectors = gateway.selectors.lock().unwrap();
        assert_eq!(
            *selectors,
            vec![
                "bestvideo[height<=1920][ext=mp4]+bestaudio/best[ext=mp4]/best".to_string(),
                "best[ext=mp4]/best".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_test_setup() {
        let gateway = Arc::new(FakeGateway::with_metadata("{}"));
        let (service, _root) = service(&gateway);
        assert!(service.test_setup().await.is_ok());
    }
}

use super::{error::MediaError, quality::FormatSelector};
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait ExtractorGateway: Send + Sync {
    /// Human-readable name of the extractor
    fn name(&self) -> &'static str;

    /// Fetch the raw metadata document for a page URL
    async fn fetch_metadata(&self, url: &str) -> Result<String, MediaError>;

    /// Download the media for a page URL to `destination`
    async fn fetch_media(
        &self,
        url: &str,
        selector: &FormatSelector,
        destination: &Path,
    ) -> Result<(), MediaError>;

    /// Test if the extractor is usable on this system
    async fn test_availability(&self) -> bool;
}

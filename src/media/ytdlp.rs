use super::{error::MediaError, gateway::ExtractorGateway, quality::FormatSelector};
use async_trait::async_trait;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Output,
    time::Duration,
};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

#[cfg(windows)]
pub const DEFAULT_BINARY: &str = "yt-dlp.exe";
#[cfg(not(windows))]
pub const DEFAULT_BINARY: &str = "yt-dlp";

pub struct YtDlpGateway {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl YtDlpGateway {
    pub fn new(binary: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn metadata_args(url: &str) -> Vec<&OsStr> {
        ["--dump-json", "--no-playlist", "--no-warnings", url]
            .into_iter()
            .map(OsStr::new)
            .collect()
    }

    fn media_args<'a>(
        url: &'a str,
        selector: &'a FormatSelector,
        destination: &'a Path,
    ) -> Vec<&'a OsStr> {
        vec![
            OsStr::new("--format"),
            OsStr::new(selector.as_str()),
            OsStr::new("--output"),
            destination.as_os_str(),
            OsStr::new("--no-playlist"),
            OsStr::new("--merge-output-format"),
            OsStr::new("mp4"),
            OsStr::new("--no-warnings"),
            OsStr::new(url),
        ]
    }

    async fn run(&self, args: &[&OsStr]) -> Result<Output, MediaError> {
        debug!("Running {} with arguments: {:?}", self.binary.display(), args);

        let mut command = Command::new(&self.binary);
        command.args(args).kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| MediaError::TimedOut(limit))??,
            None => command.output().await?,
        };

        if !output.status.success() {
            let diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
            error!(
                "yt-dlp failed with exit code {:?}. Error: {}",
                output.status.code(),
                diagnostics.trim()
            );
            return Err(MediaError::ExtractionFailed {
                exit_code: output.status.code(),
                diagnostics,
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl ExtractorGateway for YtDlpGateway {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch_metadata(&self, url: &str) -> Result<String, MediaError> {
        debug!("Extracting metadata with yt-dlp for: {}", url);

        let output = self.run(&Self::metadata_args(url)).await?;
        let json_str = String::from_utf8_lossy(&output.stdout).into_owned();

        debug!("yt-dlp JSON output: {}", json_str);
        Ok(json_str)
    }

    async fn fetch_media(
        &self,
        url: &str,
        selector: &FormatSelector,
        destination: &Path,
    ) -> Result<(), MediaError> {
        info!("Downloading media with yt-dlp: {} ({})", url, selector);

        self.run(&Self::media_args(url, selector, destination)).await?;

        Ok(())
    }

    async fn test_availability(&self) -> bool {
        let yt_dlp_available = match Command::new(&self.binary).arg("--version").output().await {
            Ok(output) => {
                if output.status.success() {
                    let version = String::from_utf8_lossy(&output.stdout);
                    info!("✅ yt-dlp is available, version: {}", version.trim());
                    true
                } else {
                    warn!("❌ yt-dlp command failed");
                    false
                }
            }
            Err(e) => {
                warn!("❌ yt-dlp not found at {}: {}", self.binary.display(), e);
                false
            }
        };

        // ffmpeg merges the separate video and audio tracks of height-capped downloads
        let ffmpeg_available = match Command::new("ffmpeg").arg("-version").output().await {
            Ok(output) => {
                if output.status.success() {
                    let version_line = String::from_utf8_lossy(&output.stdout)
                        .lines()
                        .next()
                        .unwrap_or("unknown")
                        .to_string();
                    info!("✅ ffmpeg is available: {}", version_line);
                    true
                } else {
                    warn!("❌ ffmpeg command failed");
                    false
                }
            }
            Err(e) => {
                warn!("❌ ffmpeg not found: {} (required for merging video and audio)", e);
                false
            }
        };

        if yt_dlp_available && !ffmpeg_available {
            warn!("⚠️  yt-dlp will work but quality-capped downloads fall back to progressive formats");
        }

        yt_dlp_available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_args() {
        let args = YtDlpGateway::metadata_args("https://x/v");
        assert_eq!(
            args,
            ["--dump-json", "--no-playlist", "--no-warnings", "https://x/v"]
        );
    }

    #[test]
    fn test_media_args() {
        let selector = FormatSelector::max_height(1920);
        let dest = Path::new("/tmp/clip/video.mp4");
        let args = YtDlpGateway::media_args("https://x/v", &selector, dest);

        assert_eq!(args[0], "--format");
        assert_eq!(
            args[1],
            "bestvideo[height<=1920][ext=mp4]+bestaudio/best[ext=mp4]/best"
        );
        assert_eq!(args[2], "--output");
        assert_eq!(args[3], dest.as_os_str());
        assert!(args.contains(&OsStr::new("--merge-output-format")));
        assert_eq!(args.last().copied(), Some(OsStr::new("https://x/v")));
    }

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let gateway = YtDlpGateway::new("/nonexistent/yt-dlp-binary", None);
        let err = gateway.fetch_metadata("https://x/v").await.unwrap_err();
        assert!(matches!(err, MediaError::Io(_)));
        assert!(!gateway.test_availability().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_extraction_failure() {
        // `false` ignores its arguments and exits 1
        let gateway = YtDlpGateway::new("false", None);
        let err = gateway.fetch_metadata("https://x/v").await.unwrap_err();
        assert!(matches!(
            err,
            MediaError::ExtractionFailed {
                exit_code: Some(1),
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_extractor_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-yt-dlp");
        std::fs::write(&script, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let gateway = YtDlpGateway::new(&script, Some(Duration::from_millis(200)));
        let started = std::time::Instant::now();
        let err = gateway.fetch_metadata("https://x/v").await.unwrap_err();

        assert!(matches!(err, MediaError::TimedOut(limit) if limit == Duration::from_millis(200)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    #[ignore = "Requires yt-dlp installed and network access"]
    async fn test_fetch_metadata_live() {
        let gateway = YtDlpGateway::new(DEFAULT_BINARY, Some(Duration::from_secs(60)));
        let json = gateway
            .fetch_metadata("https://www.youtube.com/watch?v=jNQXAC9IVRw")
            .await
            .unwrap();
        assert!(json.contains("\"formats\""));
    }
}

use crate::media::DEFAULT_BINARY;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub extractor: ExtractorConfig,
    pub download: DownloadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Origins allowed to call the API from a browser. `"*"` allows any.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8084".to_string(),
            allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ExtractorConfig {
    pub binary: PathBuf,
    pub timeout_secs: Option<u64>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            timeout_secs: None,
        }
    }
}

impl ExtractorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DownloadConfig {
    pub temp_dir: Option<PathBuf>,
}

impl DownloadConfig {
    pub fn temp_root(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config file {}", path))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8084");
        assert_eq!(config.server.allowed_origins, vec!["*"]);
        assert_eq!(config.extractor.binary, PathBuf::from(DEFAULT_BINARY));
        assert_eq!(config.extractor.timeout(), None);
        assert_eq!(config.download.temp_root(), std::env::temp_dir());
        assert_eq!(config.get_logging_format(), "json");
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:9000"
            allowed_origins = ["http://localhost:3000"]

            [extractor]
            binary = "/usr/local/bin/yt-dlp"
            timeout_secs = 300

            [download]
            temp_dir = "/var/tmp/clipfetch"

            [logging]
            format = "pretty"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(
            config.extractor.binary,
            PathBuf::from("/usr/local/bin/yt-dlp")
        );
        assert_eq!(config.extractor.timeout(), Some(Duration::from_secs(300)));
        assert_eq!(
            config.download.temp_root(),
            PathBuf::from("/var/tmp/clipfetch")
        );
        assert_eq!(config.get_logging_format(), "pretty");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml("[server]\nbind = \"[::]:8084\"\n").unwrap();

        assert_eq!(config.server.bind, "[::]:8084");
        assert_eq!(config.server.allowed_origins, vec!["*"]);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nformat = \"pretty\"\n").unwrap();

        let config = Config::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.get_logging_format(), "pretty");

        assert!(Config::from_file("/nonexistent/config.toml").is_err());
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(Config::from_toml("[server]\nbind = 8084\n").is_err());
    }
}

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    /// Empty or unusable URL supplied by the caller.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Extractor returned unparseable metadata: {0}")]
    MalformedMetadata(String),

    #[error("Extractor exited with {}: {}", exit_label(.exit_code), .diagnostics)]
    ExtractionFailed {
        exit_code: Option<i32>,
        diagnostics: String,
    },

    #[error("Downloaded file not found at {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("Extractor timed out after {:?}", .0)]
    TimedOut(Duration),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MediaError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Detail text for API responses; the raw stderr when the extractor produced one.
    pub fn detail(&self) -> String {
        match self {
            Self::ExtractionFailed { diagnostics, .. } => diagnostics.trim().to_string(),
            other => other.to_string(),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

impl From<serde_json::Error> for MediaError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedMetadata(e.to_string())
    }
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PereskazError {
    #[error("Listing failed for channel {channel_id}: {reason}")]
    ListingFailed { channel_id: String, reason: String },

    #[error("Transcript fetch failed for {video_id}: {reason}")]
    TranscriptFailed { video_id: String, reason: String },

    #[error("Generation failed for {video_id}: {reason}")]
    GenerationFailed { video_id: String, reason: String },

    #[error("Illustration search failed for query '{query}': {reason}")]
    IllustrationFailed { query: String, reason: String },

    #[error("Publish failed: {reason}")]
    PublishFailed { reason: String },

    #[error("Store operation failed at {path}: {reason}")]
    StoreFailed { path: PathBuf, reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

impl PereskazError {
    /// Persistence failures abort the whole batch; everything else is
    /// caught per item and the run continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PereskazError::IoError(_) | PereskazError::StoreFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PereskazError>;

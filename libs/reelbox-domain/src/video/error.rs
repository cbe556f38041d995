//! Domain errors for video operations
//!
//! These errors are independent of infrastructure details: adapters convert
//! SDK and driver errors into the matching variant, and the workflows pass
//! them through unchanged.

use thiserror::Error;

use crate::video::ids::VideoId;

/// Errors that can occur while uploading or reading videos
#[derive(Error, Debug)]
pub enum VideoError {
    /// The filename extension is not in the allow-list
    #[error("Format {format} not supported")]
    InvalidFormat { format: String },

    /// The declared size exceeds the upload cap
    #[error("File size ({size} bytes) exceeds maximum allowed ({max} bytes)")]
    TooLarge { size: u64, max: u64 },

    /// The video does not exist or belongs to another owner
    #[error("Video {0} not found")]
    NotFound(VideoId),

    /// The blob store failed or could not be reached
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The metadata store failed
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// The event channel rejected a domain event
    #[error("Event publish failed: {0}")]
    Publish(String),
}

impl VideoError {
    pub fn invalid_format(format: impl Into<String>) -> Self {
        Self::InvalidFormat {
            format: format.into(),
        }
    }

    pub fn too_large(size: u64, max: u64) -> Self {
        Self::TooLarge { size, max }
    }

    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    /// Short, stable label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFormat { .. } => "invalid_format",
            Self::TooLarge { .. } => "too_large",
            Self::NotFound(_) => "not_found",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Persistence(_) => "persistence",
            Self::Publish(_) => "publish",
        }
    }
}

/// Result type alias for video operations
pub type Result<T> = std::result::Result<T, VideoError>;

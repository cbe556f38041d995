//! Domain events broadcast after successful state changes
//!
//! Events are immutable facts. Subscribers route on [`DomainEvent::event_type`],
//! which is also the internal tag of the JSON encoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::video::{
    entity::Video,
    ids::{OwnerId, VideoId},
};

/// Routing discriminator for [`VideoUploadedEvent`]
pub const VIDEO_UPLOADED: &str = "video.uploaded";

/// Emitted once a video has been stored and its record persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoUploadedEvent {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub video_id: VideoId,
    pub owner_id: OwnerId,
    pub filename: String,
    pub size_bytes: u64,
}

impl VideoUploadedEvent {
    pub fn from_video(video: &Video) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            video_id: *video.id(),
            owner_id: *video.owner_id(),
            filename: video.original_filename().to_string(),
            size_bytes: video.size_bytes(),
        }
    }
}

/// Every event the service can publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum DomainEvent {
    #[serde(rename = "video.uploaded")]
    VideoUploaded(VideoUploadedEvent),
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::VideoUploaded(_) => VIDEO_UPLOADED,
        }
    }

    /// JSON payload as sent to subscribers
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<VideoUploadedEvent> for DomainEvent {
    fn from(event: VideoUploadedEvent) -> Self {
        Self::VideoUploaded(event)
    }
}

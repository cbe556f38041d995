//! Row mapping between the `videos` table and the domain entity

use chrono::{DateTime, Utc};
use reelbox_domain::{video::Result, OwnerId, Video, VideoError, VideoId};
use uuid::Uuid;

/// One row of the `videos` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub(crate) struct VideoRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_filename: String,
    pub storage_path: String,
    pub size_bytes: i64,
    pub format: String,
    pub duration_seconds: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl VideoRow {
    pub fn from_entity(video: &Video) -> Result<Self> {
        let size_bytes = i64::try_from(video.size_bytes()).map_err(|_| {
            VideoError::persistence(format!(
                "size {} of video {} does not fit a BIGINT",
                video.size_bytes(),
                video.id()
            ))
        })?;

        Ok(Self {
            id: (*video.id()).into(),
            owner_id: (*video.owner_id()).into(),
            original_filename: video.original_filename().to_string(),
            storage_path: video.storage_path().to_string(),
            size_bytes,
            format: video.format().to_string(),
            duration_seconds: video.duration_seconds(),
            created_at: *video.created_at(),
        })
    }

    pub fn into_entity(self) -> Result<Video> {
        let size_bytes = u64::try_from(self.size_bytes).map_err(|_| {
            VideoError::persistence(format!(
                "negative size {} stored for video {}",
                self.size_bytes, self.id
            ))
        })?;

        Ok(Video::from_parts(
            VideoId::from_uuid(self.id),
            OwnerId::from_uuid(self.owner_id),
            self.original_filename,
            self.storage_path,
            size_bytes,
            &self.format,
            self.duration_seconds,
            self.created_at,
        ))
    }
}

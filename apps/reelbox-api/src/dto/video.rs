//! DTOs for video endpoints

use chrono::{DateTime, Utc};
use reelbox_domain::video::{VideoPage, VideoView};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Public representation of a video
///
/// The storage path is deliberately absent.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    #[schema(example = "01890f4e-8a7b-7cc0-b1d2-5f1e2d3c4b5a")]
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "movie.mp4")]
    pub original_filename: String,
    #[schema(example = 1048576)]
    pub size_bytes: u64,
    #[schema(example = "mp4")]
    pub format: String,
    pub created_at: DateTime<Utc>,
}

impl From<VideoView> for VideoResponse {
    fn from(view: VideoView) -> Self {
        Self {
            id: view.id.into(),
            owner_id: view.owner_id.into(),
            original_filename: view.original_filename,
            size_bytes: view.size_bytes,
            format: view.format,
            created_at: view.created_at,
        }
    }
}

/// One page of the caller's videos
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedVideoResponse {
    pub videos: Vec<VideoResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl From<VideoPage> for PaginatedVideoResponse {
    fn from(page: VideoPage) -> Self {
        Self {
            videos: page.videos.into_iter().map(VideoResponse::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

/// Multipart body of the upload endpoint
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadVideoForm {
    /// Video file (mp4, avi, mov, mkv or webm, at most 500MB)
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Pagination parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListVideosQuery {
    /// 1-based page number
    #[param(minimum = 1, default = 1)]
    pub page: Option<u32>,
    /// Videos per page
    #[param(minimum = 1, maximum = 100, default = 10)]
    pub page_size: Option<u32>,
}

/// Download URL parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadUrlQuery {
    /// Lifetime of the URL in seconds
    #[param(minimum = 1, maximum = 604800, default = 3600)]
    pub expires_in: Option<u64>,
}

/// Presigned download URL
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadUrlResponse {
    pub url: String,
    #[schema(example = 3600)]
    pub expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "video-service")]
    pub service: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error description
    #[schema(example = "Video not found")]
    pub error: String,
}

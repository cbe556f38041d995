//! Video handlers

use std::time::Duration;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use reelbox_domain::{
    video::{entity::max_size_bytes, UploadVideoInput, VideoSource},
    VideoId,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    dto::video::{
        DownloadUrlQuery, DownloadUrlResponse, ErrorResponse, ListVideosQuery,
        PaginatedVideoResponse, UploadVideoForm, VideoResponse,
    },
    error::ApiError,
    upload::SpooledFile,
    AppState,
};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_URL_EXPIRY_SECS: u64 = 3600;
const MAX_URL_EXPIRY_SECS: u64 = 7 * 24 * 3600;
const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

struct UploadedFile {
    filename: String,
    content_type: String,
    spool: SpooledFile,
}

/// Spool the `file` field to disk
///
/// Stops reading once the size cap is passed; the workflow then rejects
/// the upload by its format or size.
async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::validation("Uploaded file has no filename"))?;
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let mut spool = SpooledFile::create(max_size_bytes()).await?;
        spool.copy_field(&mut field).await?;

        return Ok(UploadedFile {
            filename,
            content_type,
            spool,
        });
    }

    Err(ApiError::validation("Missing multipart field 'file'"))
}

/// Upload a video file
#[utoipa::path(
    post,
    path = "/videos/upload",
    request_body(content = UploadVideoForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Video uploaded", body = VideoResponse),
        (status = 400, description = "Unsupported video format", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 503, description = "Storage or auth service unavailable", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "videos"
)]
pub async fn upload_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<VideoResponse>), ApiError> {
    let file = read_file_field(&mut multipart).await?;
    info!(
        owner_id = %owner_id,
        filename = %file.filename,
        size_bytes = file.spool.size(),
        "Received upload request"
    );

    // The spool outlives the workflow, which streams from its path
    let input = UploadVideoInput {
        owner_id,
        filename: file.filename,
        size_bytes: file.spool.size(),
        data: VideoSource::file(file.spool.path()),
        content_type: file.content_type,
    };

    match state.videos.upload(input).await {
        Ok(view) => {
            state.metrics.record_upload();
            Ok((StatusCode::CREATED, Json(VideoResponse::from(view))))
        }
        Err(err) => {
            state.metrics.record_upload_failure(err.kind());
            Err(err.into())
        }
    }
}

/// Get one of the caller's videos
#[utoipa::path(
    get,
    path = "/videos/{id}",
    params(("id" = Uuid, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video found", body = VideoResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 422, description = "Malformed video id", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "videos"
)]
pub async fn get_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<VideoResponse>, ApiError> {
    let Path(id) = id?;
    let view = state.videos.get(&VideoId::from_uuid(id), &owner_id).await?;
    Ok(Json(VideoResponse::from(view)))
}

/// List the caller's videos, newest first
#[utoipa::path(
    get,
    path = "/videos",
    params(ListVideosQuery),
    responses(
        (status = 200, description = "Page of videos", body = PaginatedVideoResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 422, description = "Invalid pagination parameters", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "videos"
)]
pub async fn list_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    query: Result<Query<ListVideosQuery>, QueryRejection>,
) -> Result<Json<PaginatedVideoResponse>, ApiError> {
    let Query(query) = query?;
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(ApiError::validation("page must be at least 1"));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::validation(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let page = state.videos.list(&owner_id, page, page_size).await?;
    Ok(Json(PaginatedVideoResponse::from(page)))
}

/// Presigned download URL for one of the caller's videos
#[utoipa::path(
    get,
    path = "/videos/{id}/download-url",
    params(("id" = Uuid, Path, description = "Video id"), DownloadUrlQuery),
    responses(
        (status = 200, description = "Presigned URL", body = DownloadUrlResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 422, description = "Malformed id or invalid expiry", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "videos"
)]
pub async fn download_url_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<DownloadUrlQuery>, QueryRejection>,
) -> Result<Json<DownloadUrlResponse>, ApiError> {
    let Path(id) = id?;
    let Query(query) = query?;
    let expires_in = query.expires_in.unwrap_or(DEFAULT_URL_EXPIRY_SECS);
    if !(1..=MAX_URL_EXPIRY_SECS).contains(&expires_in) {
        return Err(ApiError::validation(format!(
            "expires_in must be between 1 and {}",
            MAX_URL_EXPIRY_SECS
        )));
    }

    let url = state
        .videos
        .download_url(
            &VideoId::from_uuid(id),
            &owner_id,
            Duration::from_secs(expires_in),
        )
        .await?;

    Ok(Json(DownloadUrlResponse { url, expires_in }))
}

/// Delete one of the caller's videos
#[utoipa::path(
    delete,
    path = "/videos/{id}",
    params(("id" = Uuid, Path, description = "Video id")),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 422, description = "Malformed video id", body = ErrorResponse),
        (status = 503, description = "Stored file could not be removed", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "videos"
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state
        .videos
        .delete(&VideoId::from_uuid(id), &owner_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

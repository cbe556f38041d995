//! HTTP error mapping
//!
//! Domain errors become fixed messages; storage keys, provider errors and
//! SQL details only reach the logs.

use std::io;

use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reelbox_domain::{video::MAX_SIZE_MB, VideoError};
use tracing::{error, warn};

use crate::{auth::AuthError, dto::video::ErrorResponse};

#[derive(Debug)]
pub enum ApiError {
    Video(VideoError),
    Auth(AuthError),
    Multipart(MultipartError),
    /// Local I/O while spooling an upload
    Io(io::Error),
    /// Well-formed request with out-of-range or missing values
    Validation(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Video(err) => match err {
                VideoError::InvalidFormat { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                VideoError::TooLarge { .. } => (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("File exceeds {}MB limit", MAX_SIZE_MB),
                ),
                VideoError::NotFound(_) => (StatusCode::NOT_FOUND, "Video not found".to_string()),
                VideoError::StorageUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage temporarily unavailable".to_string(),
                ),
                VideoError::Persistence(_) | VideoError::Publish(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            },
            Self::Auth(AuthError::MissingCredentials) => (
                StatusCode::UNAUTHORIZED,
                "Not authenticated".to_string(),
            ),
            Self::Auth(AuthError::InvalidToken) => {
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            Self::Auth(AuthError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Auth service unavailable".to_string(),
            ),
            Self::Multipart(err) => (err.status(), err.body_text()),
            Self::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            Self::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        }
    }
}

impl From<VideoError> for ApiError {
    fn from(err: VideoError) -> Self {
        Self::Video(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl From<io::Error> for ApiError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        Self::Validation(err.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(err: PathRejection) -> Self {
        Self::Validation(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = ?self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = ?self, "Request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

//! Video routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::video::{
        delete_handler, download_url_handler, get_handler, list_handler, upload_handler,
    },
    AppState,
};

/// Create video routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/videos", get(list_handler))
        .route("/videos/upload", post(upload_handler))
        .route("/videos/:id", get(get_handler).delete(delete_handler))
        .route("/videos/:id/download-url", get(download_url_handler))
}

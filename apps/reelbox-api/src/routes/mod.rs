//! API routes

pub mod video;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use reelbox_domain::video::MAX_SIZE_MB;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::video::{
        DownloadUrlResponse, ErrorResponse, HealthResponse, PaginatedVideoResponse,
        UploadVideoForm, VideoResponse,
    },
    handlers, AppState,
};

/// Request body cap: the largest accepted video plus room for multipart framing
pub const MAX_BODY_BYTES: usize = ((MAX_SIZE_MB + 1) * 1024 * 1024) as usize;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::video::upload_handler,
        handlers::video::get_handler,
        handlers::video::list_handler,
        handlers::video::download_url_handler,
        handlers::video::delete_handler,
        health_handler
    ),
    components(
        schemas(
            VideoResponse,
            PaginatedVideoResponse,
            UploadVideoForm,
            DownloadUrlResponse,
            HealthResponse,
            ErrorResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "videos", description = "Video upload and retrieval endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "Reelbox API",
        version = "0.1.0",
        description = "Video upload, storage and listing service",
        contact(
            name = "Reelbox Team"
        )
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(video::routes())
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.service_name.to_string(),
    })
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

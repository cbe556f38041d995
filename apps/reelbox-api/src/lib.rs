//! Reelbox API - Video Upload Service
//!
//! HTTP surface over the video workflows: multipart upload to object
//! storage, per-owner listing and lookup, presigned downloads and deletion.
//! Callers are authenticated by the external identity service.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod upload;

pub use routes::create_router;
pub use state::AppState;

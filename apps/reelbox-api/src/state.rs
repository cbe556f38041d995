//! Application state shared across handlers

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reelbox_domain::{
    ports::{EventPublisher, VideoRepository, VideoStorage},
    video::{UploadVideoInput, VideoPage, VideoView},
    OwnerId, VideoError, VideoId, VideoService,
};

use crate::{auth::IdentityProvider, metrics::Metrics};

/// Object-safe view of the video workflows
///
/// `VideoService` is generic over its adapters; handlers only see this
/// trait, so the same router runs against AWS or in-memory ports.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn upload(&self, input: UploadVideoInput) -> Result<VideoView, VideoError>;

    async fn get(&self, video_id: &VideoId, requester: &OwnerId) -> Result<VideoView, VideoError>;

    async fn list(
        &self,
        owner_id: &OwnerId,
        page: u32,
        page_size: u32,
    ) -> Result<VideoPage, VideoError>;

    async fn download_url(
        &self,
        video_id: &VideoId,
        requester: &OwnerId,
        expires_in: Duration,
    ) -> Result<String, VideoError>;

    async fn delete(&self, video_id: &VideoId, requester: &OwnerId) -> Result<(), VideoError>;
}

#[async_trait]
impl<S, R, P> VideoCatalog for VideoService<S, R, P>
where
    S: VideoStorage,
    R: VideoRepository,
    P: EventPublisher,
{
    async fn upload(&self, input: UploadVideoInput) -> Result<VideoView, VideoError> {
        VideoService::upload(self, input).await
    }

    async fn get(&self, video_id: &VideoId, requester: &OwnerId) -> Result<VideoView, VideoError> {
        VideoService::get(self, video_id, requester).await
    }

    async fn list(
        &self,
        owner_id: &OwnerId,
        page: u32,
        page_size: u32,
    ) -> Result<VideoPage, VideoError> {
        VideoService::list(self, owner_id, page, page_size).await
    }

    async fn download_url(
        &self,
        video_id: &VideoId,
        requester: &OwnerId,
        expires_in: Duration,
    ) -> Result<String, VideoError> {
        VideoService::download_url(self, video_id, requester, expires_in).await
    }

    async fn delete(&self, video_id: &VideoId, requester: &OwnerId) -> Result<(), VideoError> {
        VideoService::delete(self, video_id, requester).await
    }
}

#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoCatalog>,
    pub identity: Arc<dyn IdentityProvider>,
    pub metrics: Arc<Metrics>,
    pub service_name: Arc<str>,
}

impl AppState {
    pub fn new<V, I>(videos: V, identity: I, metrics: Metrics, service_name: &str) -> Self
    where
        V: VideoCatalog + 'static,
        I: IdentityProvider + 'static,
    {
        Self {
            videos: Arc::new(videos),
            identity: Arc::new(identity),
            metrics: Arc::new(metrics),
            service_name: Arc::from(service_name),
        }
    }
}

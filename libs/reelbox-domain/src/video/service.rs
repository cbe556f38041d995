//! Video service - upload, read and listing workflows
//!
//! The service coordinates the entity rules with the three ports. It keeps
//! no mutable in-process state: every request runs independently and all
//! durable state lives behind the storage and repository ports.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::entity::{self, Video};
use super::{DomainEvent, OwnerId, VideoError, VideoId, VideoSource, VideoUploadedEvent};
use crate::ports::{EventPublisher, VideoRepository, VideoStorage};

/// Input of the upload workflow
#[derive(Debug, Clone)]
pub struct UploadVideoInput {
    pub owner_id: OwnerId,
    /// Client-supplied filename, used for format inference and display
    pub filename: String,
    pub data: VideoSource,
    /// Declared or measured size in bytes
    pub size_bytes: u64,
    pub content_type: String,
}

/// Result view of a stored video
///
/// Carries the storage path for internal callers; the HTTP layer does not
/// expose it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoView {
    pub id: VideoId,
    pub owner_id: OwnerId,
    pub original_filename: String,
    pub storage_path: String,
    pub size_bytes: u64,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Video> for VideoView {
    fn from(video: &Video) -> Self {
        Self {
            id: *video.id(),
            owner_id: *video.owner_id(),
            original_filename: video.original_filename().to_string(),
            storage_path: video.storage_path().to_string(),
            size_bytes: video.size_bytes(),
            format: video.format().to_string(),
            created_at: *video.created_at(),
        }
    }
}

/// One page of an owner's videos
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoPage {
    pub videos: Vec<VideoView>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Service orchestrating video storage, persistence and events
///
/// Generic over the three ports; the compiler generates a specialized
/// version per adapter set.
pub struct VideoService<S, R, P> {
    storage: S,
    repository: R,
    publisher: P,
}

impl<S, R, P> VideoService<S, R, P>
where
    S: VideoStorage,
    R: VideoRepository,
    P: EventPublisher,
{
    pub fn new(storage: S, repository: R, publisher: P) -> Self {
        Self {
            storage,
            repository,
            publisher,
        }
    }

    /// Upload a video
    ///
    /// 1. Validates format, then size (no side effects on failure)
    /// 2. Generates the id and writes the bytes through the storage port
    /// 3. Persists the record
    /// 4. Publishes a `video.uploaded` event
    ///
    /// A blob whose record fails to persist is left in place. A failed
    /// publish is logged and does not fail the upload.
    ///
    /// # Errors
    ///
    /// - `VideoError::InvalidFormat` if the extension is not allowed
    /// - `VideoError::TooLarge` if the declared size exceeds the cap
    /// - `VideoError::StorageUnavailable` if the blob write fails
    /// - whatever the repository returns if the save fails
    #[instrument(
        skip(self, input),
        fields(owner_id = %input.owner_id, filename = %input.filename, size_bytes = input.size_bytes)
    )]
    pub async fn upload(&self, input: UploadVideoInput) -> Result<VideoView, VideoError> {
        let format = entity::derive_format(&input.filename);
        if !entity::is_allowed_format(&format) {
            return Err(VideoError::invalid_format(format));
        }

        let max = entity::max_size_bytes();
        if input.size_bytes > max {
            return Err(VideoError::too_large(input.size_bytes, max));
        }

        let video_id = VideoId::new();
        let key = entity::storage_key(&input.owner_id, &video_id, &format);

        debug!(video_id = %video_id, key = %key, "Writing video to storage");
        let storage_path = self
            .storage
            .upload(input.data, &key, &input.content_type)
            .await?;

        let video = Video::new(
            video_id,
            input.owner_id,
            input.filename,
            storage_path,
            input.size_bytes,
            &format,
        );
        let saved = self.repository.save(&video).await?;

        let event = DomainEvent::from(VideoUploadedEvent::from_video(&saved));
        if let Err(err) = self.publisher.publish(&event).await {
            warn!(
                video_id = %saved.id(),
                error = %err,
                "Failed to publish upload event, keeping upload"
            );
        }

        info!(video_id = %saved.id(), format = %saved.format(), "Video uploaded");
        Ok(VideoView::from(&saved))
    }

    /// Fetch one of the requester's videos
    ///
    /// # Errors
    ///
    /// Returns `VideoError::NotFound` both when the video does not exist and
    /// when it belongs to someone else.
    #[instrument(skip(self), fields(video_id = %video_id, requester = %requester))]
    pub async fn get(&self, video_id: &VideoId, requester: &OwnerId) -> Result<VideoView, VideoError> {
        let video = self.find_owned(video_id, requester).await?;
        Ok(VideoView::from(&video))
    }

    /// List the owner's videos, newest first
    ///
    /// `page` is 1-based; bounds are validated by the caller. The page and
    /// the total come from two independent reads and may briefly disagree
    /// under concurrent writes.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list(
        &self,
        owner_id: &OwnerId,
        page: u32,
        page_size: u32,
    ) -> Result<VideoPage, VideoError> {
        let skip = u64::from(page.saturating_sub(1)) * u64::from(page_size);

        let videos = self
            .repository
            .find_by_owner(owner_id, skip, u64::from(page_size))
            .await?;
        let total = self.repository.count_by_owner(owner_id).await?;

        Ok(VideoPage {
            videos: videos.iter().map(VideoView::from).collect(),
            total,
            page,
            page_size,
        })
    }

    /// Presigned download URL for one of the requester's videos
    #[instrument(skip(self), fields(video_id = %video_id, requester = %requester))]
    pub async fn download_url(
        &self,
        video_id: &VideoId,
        requester: &OwnerId,
        expires_in: Duration,
    ) -> Result<String, VideoError> {
        let video = self.find_owned(video_id, requester).await?;
        self.storage
            .retrieval_url(&video.storage_key(), expires_in)
            .await
    }

    /// Delete one of the requester's videos
    ///
    /// The record goes first so that a live record never points at a removed
    /// blob. A blob that cannot be removed afterwards is reported as
    /// `StorageUnavailable`.
    #[instrument(skip(self), fields(video_id = %video_id, requester = %requester))]
    pub async fn delete(&self, video_id: &VideoId, requester: &OwnerId) -> Result<(), VideoError> {
        let video = self.find_owned(video_id, requester).await?;

        if !self.repository.delete(video.id()).await? {
            return Err(VideoError::NotFound(*video_id));
        }

        let key = video.storage_key();
        if !self.storage.delete(&key).await? {
            warn!(video_id = %video_id, key = %key, "Record deleted but blob was left behind");
            return Err(VideoError::storage_unavailable(format!(
                "object '{}' could not be removed",
                key
            )));
        }

        info!(video_id = %video_id, "Video deleted");
        Ok(())
    }

    async fn find_owned(&self, video_id: &VideoId, requester: &OwnerId) -> Result<Video, VideoError> {
        match self.repository.find_by_id(video_id).await? {
            Some(video) if video.is_owned_by(requester) => Ok(video),
            // Another owner's video is indistinguishable from a missing one
            _ => Err(VideoError::NotFound(*video_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CallLog, InMemoryEventPublisher, InMemoryVideoRepository, InMemoryVideoStorage};
    use uuid::Uuid;

    type MemoryService =
        VideoService<InMemoryVideoStorage, InMemoryVideoRepository, InMemoryEventPublisher>;

    struct Fixture {
        service: MemoryService,
        storage: InMemoryVideoStorage,
        repository: InMemoryVideoRepository,
        publisher: InMemoryEventPublisher,
        log: CallLog,
    }

    fn fixture() -> Fixture {
        let log = CallLog::new();
        let storage = InMemoryVideoStorage::with_log(log.clone());
        let repository = InMemoryVideoRepository::with_log(log.clone());
        let publisher = InMemoryEventPublisher::with_log(log.clone());
        let service = VideoService::new(storage.clone(), repository.clone(), publisher.clone());

        Fixture {
            service,
            storage,
            repository,
            publisher,
            log,
        }
    }

    fn owner() -> OwnerId {
        OwnerId::from_uuid(Uuid::new_v4())
    }

    fn input(owner_id: OwnerId, filename: &str, size_bytes: u64) -> UploadVideoInput {
        UploadVideoInput {
            owner_id,
            filename: filename.to_string(),
            data: VideoSource::from(vec![0u8; 16]),
            size_bytes,
            content_type: "video/mp4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_success() {
        let f = fixture();
        let owner_id = owner();

        let view = f
            .service
            .upload(input(owner_id, "movie.mp4", 1024))
            .await
            .unwrap();

        assert_eq!(view.owner_id, owner_id);
        assert_eq!(view.original_filename, "movie.mp4");
        assert_eq!(view.size_bytes, 1024);
        assert_eq!(view.format, "mp4");

        let key = format!("videos/{}/{}.mp4", owner_id, view.id);
        assert_eq!(view.storage_path, format!("memory://memory/{}", key));
        assert!(f.storage.object(&key).is_some());
        assert_eq!(f.repository.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_runs_storage_then_save_then_publish_once() {
        let f = fixture();

        f.service
            .upload(input(owner(), "movie.mp4", 1024))
            .await
            .unwrap();

        let entries = f.log.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].starts_with("storage.upload "));
        assert!(entries[1].starts_with("repository.save "));
        assert_eq!(entries[2], "publisher.publish video.uploaded");
    }

    #[tokio::test]
    async fn test_upload_format_is_lowercased() {
        let f = fixture();

        let view = f
            .service
            .upload(input(owner(), "Holiday.MP4", 10))
            .await
            .unwrap();

        assert_eq!(view.format, "mp4");
        assert!(view.storage_path.ends_with(".mp4"));
    }

    #[tokio::test]
    async fn test_invalid_format_has_no_side_effects() {
        let f = fixture();

        for filename in ["notes.txt", "clip.gif", "noextension", "archive.mp4.zip"] {
            let err = f
                .service
                .upload(input(owner(), filename, 10))
                .await
                .unwrap_err();
            assert!(
                matches!(err, VideoError::InvalidFormat { .. }),
                "{} should be rejected",
                filename
            );
        }

        assert!(f.log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_too_large_has_no_side_effects() {
        let f = fixture();
        let max = entity::max_size_bytes();

        let err = f
            .service
            .upload(input(owner(), "big.mkv", max + 1))
            .await
            .unwrap_err();

        assert!(matches!(err, VideoError::TooLarge { size, .. } if size == max + 1));
        assert!(f.log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_size_at_limit_is_accepted() {
        let f = fixture();

        let result = f
            .service
            .upload(input(owner(), "big.mkv", entity::max_size_bytes()))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_format_error_takes_precedence_over_size() {
        let f = fixture();

        let err = f
            .service
            .upload(input(owner(), "big.exe", entity::max_size_bytes() * 2))
            .await
            .unwrap_err();

        assert!(matches!(err, VideoError::InvalidFormat { .. }));
    }

    #[tokio::test]
    async fn test_storage_failure_persists_nothing() {
        let f = fixture();
        f.storage.fail_uploads(true);

        let err = f
            .service
            .upload(input(owner(), "movie.mp4", 10))
            .await
            .unwrap_err();

        assert!(matches!(err, VideoError::StorageUnavailable(_)));
        assert!(f.repository.is_empty());
        assert!(f.log.matching("repository.").is_empty());
        assert!(f.publisher.events().is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_leaves_blob_and_skips_publish() {
        let f = fixture();
        f.repository.fail_saves(true);

        let err = f
            .service
            .upload(input(owner(), "movie.mp4", 10))
            .await
            .unwrap_err();

        assert!(matches!(err, VideoError::Persistence(_)));
        assert_eq!(f.storage.object_count(), 1);
        assert!(f.log.matching("publisher.").is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_is_swallowed() {
        let f = fixture();
        f.publisher.fail_publishes(true);

        let view = f
            .service
            .upload(input(owner(), "movie.webm", 10))
            .await
            .unwrap();

        assert_eq!(f.log.matching("publisher.publish").len(), 1);
        assert!(f.publisher.events().is_empty());
        assert_eq!(f.repository.len(), 1);
        assert_eq!(view.format, "webm");
    }

    #[tokio::test]
    async fn test_published_event_matches_saved_video() {
        let f = fixture();
        let owner_id = owner();

        let view = f
            .service
            .upload(input(owner_id, "movie.mov", 2048))
            .await
            .unwrap();

        let events = f.publisher.events();
        assert_eq!(events.len(), 1);
        let DomainEvent::VideoUploaded(event) = &events[0];
        assert_eq!(event.video_id, view.id);
        assert_eq!(event.owner_id, owner_id);
        assert_eq!(event.filename, "movie.mov");
        assert_eq!(event.size_bytes, 2048);
    }

    #[tokio::test]
    async fn test_uploads_generate_distinct_ids() {
        let f = fixture();
        let owner_id = owner();

        let a = f.service.upload(input(owner_id, "a.mp4", 1)).await.unwrap();
        let b = f.service.upload(input(owner_id, "a.mp4", 1)).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_ne!(a.storage_path, b.storage_path);
    }

    #[tokio::test]
    async fn test_get_own_video() {
        let f = fixture();
        let owner_id = owner();
        let uploaded = f.service.upload(input(owner_id, "a.mp4", 1)).await.unwrap();

        let fetched = f.service.get(&uploaded.id, &owner_id).await.unwrap();

        assert_eq!(fetched, uploaded);
    }

    #[tokio::test]
    async fn test_get_foreign_video_looks_missing() {
        let f = fixture();
        let uploaded = f.service.upload(input(owner(), "a.mp4", 1)).await.unwrap();

        let foreign = f.service.get(&uploaded.id, &owner()).await.unwrap_err();
        let missing = f.service.get(&VideoId::new(), &owner()).await.unwrap_err();

        assert!(matches!(foreign, VideoError::NotFound(id) if id == uploaded.id));
        assert!(matches!(missing, VideoError::NotFound(_)));
        assert_eq!(foreign.kind(), missing.kind());
    }

    #[tokio::test]
    async fn test_list_computes_offset_and_metadata() {
        let f = fixture();
        let owner_id = owner();
        for i in 0..11 {
            f.service
                .upload(input(owner_id, &format!("clip{}.mp4", i), 1))
                .await
                .unwrap();
        }
        f.service.upload(input(owner(), "other.mp4", 1)).await.unwrap();

        let page = f.service.list(&owner_id, 2, 5).await.unwrap();

        assert_eq!(
            f.log.matching("repository.find_by_owner"),
            vec!["repository.find_by_owner skip=5 limit=5"]
        );
        assert_eq!(page.total, 11);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 5);
        assert_eq!(page.videos.len(), 5);
        assert!(page.videos.iter().all(|v| v.owner_id == owner_id));
    }

    #[tokio::test]
    async fn test_list_last_partial_page() {
        let f = fixture();
        let owner_id = owner();
        for _ in 0..11 {
            f.service.upload(input(owner_id, "c.mp4", 1)).await.unwrap();
        }

        let page = f.service.list(&owner_id, 3, 5).await.unwrap();

        assert_eq!(page.videos.len(), 1);
        assert_eq!(page.total, 11);
    }

    #[tokio::test]
    async fn test_list_empty_owner() {
        let f = fixture();

        let page = f.service.list(&owner(), 1, 10).await.unwrap();

        assert!(page.videos.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_download_url_is_scoped_to_owner() {
        let f = fixture();
        let owner_id = owner();
        let uploaded = f.service.upload(input(owner_id, "a.avi", 1)).await.unwrap();

        let url = f
            .service
            .download_url(&uploaded.id, &owner_id, Duration::from_secs(60))
            .await
            .unwrap();
        assert!(url.contains(&format!("videos/{}/{}.avi", owner_id, uploaded.id)));
        assert!(url.ends_with("expires_in=60"));

        let err = f
            .service
            .download_url(&uploaded.id, &owner(), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, VideoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_record_then_blob() {
        let f = fixture();
        let owner_id = owner();
        let uploaded = f.service.upload(input(owner_id, "a.mp4", 1)).await.unwrap();

        f.service.delete(&uploaded.id, &owner_id).await.unwrap();

        assert!(f.repository.is_empty());
        assert_eq!(f.storage.object_count(), 0);
        let entries = f.log.entries();
        let record = entries.iter().position(|e| e.starts_with("repository.delete"));
        let blob = entries.iter().position(|e| e.starts_with("storage.delete"));
        assert!(record < blob);
    }

    #[tokio::test]
    async fn test_delete_foreign_video_is_not_found() {
        let f = fixture();
        let uploaded = f.service.upload(input(owner(), "a.mp4", 1)).await.unwrap();

        let err = f.service.delete(&uploaded.id, &owner()).await.unwrap_err();

        assert!(matches!(err, VideoError::NotFound(_)));
        assert_eq!(f.repository.len(), 1);
        assert_eq!(f.storage.object_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_surfaces_orphaned_blob() {
        let f = fixture();
        let owner_id = owner();
        let uploaded = f.service.upload(input(owner_id, "a.mp4", 1)).await.unwrap();
        f.storage.fail_deletes(true);

        let err = f.service.delete(&uploaded.id, &owner_id).await.unwrap_err();

        assert!(matches!(err, VideoError::StorageUnavailable(_)));
        assert!(f.repository.is_empty());
    }
}

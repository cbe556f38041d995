//! In-memory implementations of the ports
//!
//! Used as test doubles for the workflows and for running the HTTP layer
//! without AWS or PostgreSQL. Every adapter is cheaply cloneable and clones
//! share state, so a test can keep a handle after moving one into a
//! `VideoService`. Calls are appended to a [`CallLog`] which several adapters
//! may share to observe cross-port ordering.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;

use crate::ports::{EventPublisher, VideoRepository, VideoStorage};
use crate::video::{DomainEvent, OwnerId, Result, Video, VideoError, VideoId, VideoSource};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered record of port calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        lock(&self.0).push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.0).clone()
    }

    /// Entries whose text starts with `prefix`
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        lock(&self.0)
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// A stored blob
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Blob storage backed by a `HashMap`
#[derive(Debug, Clone)]
pub struct InMemoryVideoStorage {
    bucket: String,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    fail_uploads: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
    calls: CallLog,
}

impl InMemoryVideoStorage {
    pub fn new() -> Self {
        Self::with_log(CallLog::new())
    }

    pub fn with_log(calls: CallLog) -> Self {
        Self {
            bucket: "memory".to_string(),
            objects: Arc::default(),
            fail_uploads: Arc::default(),
            fail_deletes: Arc::default(),
            calls,
        }
    }

    /// Make every subsequent upload fail with `StorageUnavailable`
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent delete fail with `StorageUnavailable`
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        lock(&self.objects).get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn calls(&self) -> &CallLog {
        &self.calls
    }
}

impl Default for InMemoryVideoStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoStorage for InMemoryVideoStorage {
    fn upload(
        &self,
        source: VideoSource,
        key: &str,
        content_type: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        let objects = self.objects.clone();
        let failing = self.fail_uploads.load(Ordering::SeqCst);
        let path = format!("memory://{}/{}", self.bucket, key);
        let key = key.to_string();
        let content_type = content_type.to_string();
        let calls = self.calls.clone();

        async move {
            calls.record(format!("storage.upload {}", key));
            if failing {
                return Err(VideoError::storage_unavailable("in-memory storage offline"));
            }
            let data = match source {
                VideoSource::Memory(data) => data,
                VideoSource::File(path) => tokio::fs::read(&path)
                    .await
                    .map(Bytes::from)
                    .map_err(|err| {
                        VideoError::storage_unavailable(format!(
                            "cannot read '{}': {}",
                            path.display(),
                            err
                        ))
                    })?,
            };
            lock(&objects).insert(key, StoredObject { data, content_type });
            Ok(path)
        }
    }

    fn retrieval_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> impl Future<Output = Result<String>> + Send {
        let url = format!(
            "memory://{}/{}?expires_in={}",
            self.bucket,
            key,
            expires_in.as_secs()
        );
        let calls = self.calls.clone();

        async move {
            calls.record("storage.retrieval_url");
            Ok(url)
        }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<bool>> + Send {
        let objects = self.objects.clone();
        let failing = self.fail_deletes.load(Ordering::SeqCst);
        let key = key.to_string();
        let calls = self.calls.clone();

        async move {
            calls.record(format!("storage.delete {}", key));
            if failing {
                return Err(VideoError::storage_unavailable("in-memory storage offline"));
            }
            // Missing keys count as deleted, as with S3
            lock(&objects).remove(&key);
            Ok(true)
        }
    }
}

/// Metadata store backed by a `HashMap`
#[derive(Debug, Clone)]
pub struct InMemoryVideoRepository {
    videos: Arc<Mutex<HashMap<VideoId, Video>>>,
    fail_saves: Arc<AtomicBool>,
    calls: CallLog,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::with_log(CallLog::new())
    }

    pub fn with_log(calls: CallLog) -> Self {
        Self {
            videos: Arc::default(),
            fail_saves: Arc::default(),
            calls,
        }
    }

    /// Make every subsequent save fail with `Persistence`
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Insert a record directly, bypassing the call log
    pub fn seed(&self, video: Video) {
        lock(&self.videos).insert(*video.id(), video);
    }

    pub fn len(&self) -> usize {
        lock(&self.videos).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn calls(&self) -> &CallLog {
        &self.calls
    }
}

impl Default for InMemoryVideoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoRepository for InMemoryVideoRepository {
    fn save(&self, video: &Video) -> impl Future<Output = Result<Video>> + Send {
        let videos = self.videos.clone();
        let failing = self.fail_saves.load(Ordering::SeqCst);
        let video = video.clone();
        let calls = self.calls.clone();

        async move {
            calls.record(format!("repository.save {}", video.id()));
            if failing {
                return Err(VideoError::persistence("in-memory repository offline"));
            }
            lock(&videos).insert(*video.id(), video.clone());
            Ok(video)
        }
    }

    fn find_by_id(&self, id: &VideoId) -> impl Future<Output = Result<Option<Video>>> + Send {
        let videos = self.videos.clone();
        let id = *id;
        let calls = self.calls.clone();

        async move {
            calls.record(format!("repository.find_by_id {}", id));
            Ok(lock(&videos).get(&id).cloned())
        }
    }

    fn find_by_owner(
        &self,
        owner_id: &OwnerId,
        skip: u64,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<Video>>> + Send {
        let videos = self.videos.clone();
        let owner_id = *owner_id;
        let calls = self.calls.clone();

        async move {
            calls.record(format!(
                "repository.find_by_owner skip={} limit={}",
                skip, limit
            ));
            let mut owned: Vec<Video> = lock(&videos)
                .values()
                .filter(|video| video.is_owned_by(&owner_id))
                .cloned()
                .collect();
            // Same ordering as the SQL adapter: newest first, id breaks ties
            owned.sort_by(|a, b| {
                b.created_at()
                    .cmp(a.created_at())
                    .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
            });

            let skip = usize::try_from(skip).unwrap_or(usize::MAX);
            let limit = usize::try_from(limit).unwrap_or(usize::MAX);
            Ok(owned.into_iter().skip(skip).take(limit).collect())
        }
    }

    fn count_by_owner(&self, owner_id: &OwnerId) -> impl Future<Output = Result<u64>> + Send {
        let videos = self.videos.clone();
        let owner_id = *owner_id;
        let calls = self.calls.clone();

        async move {
            calls.record("repository.count_by_owner");
            let count = lock(&videos)
                .values()
                .filter(|video| video.is_owned_by(&owner_id))
                .count();
            Ok(count as u64)
        }
    }

    fn delete(&self, id: &VideoId) -> impl Future<Output = Result<bool>> + Send {
        let videos = self.videos.clone();
        let id = *id;
        let calls = self.calls.clone();

        async move {
            calls.record(format!("repository.delete {}", id));
            Ok(lock(&videos).remove(&id).is_some())
        }
    }
}

/// Event publisher that keeps every published event
#[derive(Debug, Clone)]
pub struct InMemoryEventPublisher {
    events: Arc<Mutex<Vec<DomainEvent>>>,
    failing: Arc<AtomicBool>,
    calls: CallLog,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::with_log(CallLog::new())
    }

    pub fn with_log(calls: CallLog) -> Self {
        Self {
            events: Arc::default(),
            failing: Arc::default(),
            calls,
        }
    }

    /// Make every subsequent publish fail with `Publish`
    pub fn fail_publishes(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        lock(&self.events).clone()
    }

    pub fn calls(&self) -> &CallLog {
        &self.calls
    }
}

impl Default for InMemoryEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventPublisher {
    fn publish(&self, event: &DomainEvent) -> impl Future<Output = Result<()>> + Send {
        let events = self.events.clone();
        let failing = self.failing.load(Ordering::SeqCst);
        let event = event.clone();
        let calls = self.calls.clone();

        async move {
            calls.record(format!("publisher.publish {}", event.event_type()));
            if failing {
                return Err(VideoError::publish("in-memory channel closed"));
            }
            lock(&events).push(event);
            Ok(())
        }
    }
}

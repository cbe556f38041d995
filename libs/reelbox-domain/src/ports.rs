//! Ports (trait definitions) for external dependencies
//!
//! The domain defines what it needs from blob storage, the metadata store
//! and the event channel; adapter crates provide the implementations.
//!
//! ## Static Dispatch
//!
//! Like the rest of the domain, these traits use `impl Future` return types
//! instead of `async_trait`, so `VideoService` is monomorphized for each set
//! of adapters.

use std::future::Future;
use std::time::Duration;

use crate::video::{DomainEvent, OwnerId, Result, Video, VideoId, VideoSource};

/// Port for blob storage of video bytes
pub trait VideoStorage: Send + Sync {
    /// Write the full payload under `key`, streaming file sources
    ///
    /// Must be atomic from the caller's point of view: either the object
    /// exists completely afterwards, or the call fails and nothing is
    /// visible under `key`.
    ///
    /// # Returns
    ///
    /// The storage path of the written object (e.g. `s3://bucket/key`)
    ///
    /// # Errors
    ///
    /// Returns `VideoError::StorageUnavailable` on transport or provider errors
    fn upload(
        &self,
        source: VideoSource,
        key: &str,
        content_type: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Produce a time-limited URL granting read access to `key`
    ///
    /// Has no side effect on the object itself.
    fn retrieval_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Remove the object stored under `key`
    ///
    /// Deleting an absent key is not an error; whether it reports `true`
    /// is up to the adapter.
    fn delete(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;
}

/// Port for durable video metadata
pub trait VideoRepository: Send + Sync {
    /// Insert or update a record, keyed by id
    fn save(&self, video: &Video) -> impl Future<Output = Result<Video>> + Send;

    fn find_by_id(&self, id: &VideoId) -> impl Future<Output = Result<Option<Video>>> + Send;

    /// A page of the owner's videos, newest first
    ///
    /// `skip` and `limit` implement offset pagination over `created_at`
    /// descending.
    fn find_by_owner(
        &self,
        owner_id: &OwnerId,
        skip: u64,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<Video>>> + Send;

    /// Total number of the owner's videos, independent of any page window
    fn count_by_owner(&self, owner_id: &OwnerId) -> impl Future<Output = Result<u64>> + Send;

    /// Remove a record
    ///
    /// Returns `true` iff a record existed and was removed.
    fn delete(&self, id: &VideoId) -> impl Future<Output = Result<bool>> + Send;
}

/// Port for broadcasting domain events
///
/// Delivery is best effort. An implementation may legitimately do nothing
/// (e.g. no topic configured) and still report success.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &DomainEvent) -> impl Future<Output = Result<()>> + Send;
}

//! Domain entities for uploaded videos
//!
//! A Video is the aggregate root of the service: one record per uploaded
//! file, owned by exactly one user. Validity (format allow-list, size cap)
//! is exposed as derived queries rather than enforced by the constructor,
//! so the upload workflow gates input before an entity is ever built.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::video::ids::{OwnerId, VideoId};

/// File extensions accepted for upload
pub const ALLOWED_FORMATS: [&str; 5] = ["mp4", "avi", "mov", "mkv", "webm"];

/// Maximum accepted video size in MiB
pub const MAX_SIZE_MB: u64 = 500;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Maximum accepted video size in bytes
pub const fn max_size_bytes() -> u64 {
    MAX_SIZE_MB * BYTES_PER_MB
}

/// Derive the video format from a client-supplied filename
///
/// Returns the lower-cased text after the last `.`. A name without any `.`
/// is returned whole (lower-cased), which never matches the allow-list.
pub fn derive_format(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or(filename)
        .to_lowercase()
}

/// Whether `format` is one of [`ALLOWED_FORMATS`]
pub fn is_allowed_format(format: &str) -> bool {
    ALLOWED_FORMATS.contains(&format)
}

/// Compose the object storage key for a video
///
/// Keys are namespaced by owner and embed the generated id, so they never
/// collide across owners or uploads.
pub fn storage_key(owner_id: &OwnerId, video_id: &VideoId, format: &str) -> String {
    format!("videos/{}/{}.{}", owner_id, video_id, format)
}

/// An uploaded video
///
/// Two videos are equal iff their ids are equal, and hashing only looks at
/// the id, so a Video can key a set or map purely by identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    id: VideoId,
    owner_id: OwnerId,
    original_filename: String,
    /// Opaque reference returned by the storage port
    storage_path: String,
    size_bytes: u64,
    /// Lower-cased file extension
    format: String,
    /// Set later by post-processing
    duration_seconds: Option<f64>,
    created_at: DateTime<Utc>,
}

impl Video {
    /// Create a new Video stamped with the current time
    ///
    /// The format is lower-cased but not checked against the allow-list;
    /// see [`Video::is_valid_format`].
    pub fn new(
        id: VideoId,
        owner_id: OwnerId,
        original_filename: impl Into<String>,
        storage_path: impl Into<String>,
        size_bytes: u64,
        format: &str,
    ) -> Self {
        Self {
            id,
            owner_id,
            original_filename: original_filename.into(),
            storage_path: storage_path.into(),
            size_bytes,
            format: format.to_lowercase(),
            duration_seconds: None,
            created_at: Utc::now(),
        }
    }

    /// Create a Video with explicit values (used for reconstruction)
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: VideoId,
        owner_id: OwnerId,
        original_filename: String,
        storage_path: String,
        size_bytes: u64,
        format: &str,
        duration_seconds: Option<f64>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            original_filename,
            storage_path,
            size_bytes,
            format: format.to_lowercase(),
            duration_seconds,
            created_at,
        }
    }

    pub fn id(&self) -> &VideoId {
        &self.id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub fn storage_path(&self) -> &str {
        &self.storage_path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration_seconds
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// Size in MiB
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB as f64
    }

    pub fn is_valid_format(&self) -> bool {
        is_allowed_format(&self.format)
    }

    pub fn is_valid_size(&self) -> bool {
        self.size_mb() <= MAX_SIZE_MB as f64
    }

    /// Check whether `owner` owns this video
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner_id == owner
    }

    /// Key of the stored object backing this video
    pub fn storage_key(&self) -> String {
        storage_key(&self.owner_id, &self.id, &self.format)
    }

    /// Record the duration measured by post-processing
    pub fn set_duration(&mut self, duration_seconds: f64) {
        self.duration_seconds = Some(duration_seconds);
    }
}

impl PartialEq for Video {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Video {}

impl Hash for Video {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

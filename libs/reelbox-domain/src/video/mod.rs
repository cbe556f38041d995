//! Video domain module
//!
//! The Video aggregate, its identifiers, errors and events, and the service
//! implementing the upload, read and listing workflows.

pub mod entity;
pub mod error;
pub mod event;
pub mod ids;
pub mod service;
pub mod source;

pub use entity::{derive_format, is_allowed_format, Video, ALLOWED_FORMATS, MAX_SIZE_MB};
pub use error::{Result, VideoError};
pub use event::{DomainEvent, VideoUploadedEvent, VIDEO_UPLOADED};
pub use ids::{OwnerId, VideoId};
pub use service::{UploadVideoInput, VideoPage, VideoService, VideoView};
pub use source::VideoSource;

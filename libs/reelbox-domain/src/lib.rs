//! # Reelbox Domain Layer
//!
//! Pure business logic for the Reelbox video service, following hexagonal
//! architecture:
//!
//! - **Entities**: the `Video` aggregate and its validity rules
//! - **Ports**: `VideoStorage`, `VideoRepository` and `EventPublisher`
//! - **Services**: `VideoService`, orchestrating upload, get, list, download
//!   URLs and deletion
//! - **Memory**: in-memory port implementations for tests and local runs
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (AWS, SQL,
//! HTTP). Adapter crates implement the ports.
//!
//! ## Example
//!
//! ```rust
//! use reelbox_domain::memory::{InMemoryEventPublisher, InMemoryVideoRepository, InMemoryVideoStorage};
//! use reelbox_domain::video::{OwnerId, UploadVideoInput, VideoService, VideoSource};
//!
//! # async fn example() {
//! let service = VideoService::new(
//!     InMemoryVideoStorage::new(),
//!     InMemoryVideoRepository::new(),
//!     InMemoryEventPublisher::new(),
//! );
//! let view = service
//!     .upload(UploadVideoInput {
//!         owner_id: OwnerId::from_uuid(uuid::Uuid::new_v4()),
//!         filename: "movie.mp4".to_string(),
//!         data: VideoSource::from(&b"...."[..]),
//!         size_bytes: 4,
//!         content_type: "video/mp4".to_string(),
//!     })
//!     .await
//!     .unwrap();
//! println!("Uploaded video: {}", view.id);
//! # }
//! ```

pub mod memory;
pub mod ports;
pub mod video;

// Re-export commonly used types
pub use ports::{EventPublisher, VideoRepository, VideoStorage};
pub use video::{OwnerId, Video, VideoError, VideoId, VideoService};

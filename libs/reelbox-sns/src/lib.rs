//! SNS adapter for the Reelbox `EventPublisher` port

mod publisher;

pub use publisher::{SnsEventPublisher, SnsPublisherConfig};

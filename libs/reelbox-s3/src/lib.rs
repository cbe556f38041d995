//! S3 adapter for the Reelbox `VideoStorage` port

pub mod infrastructure;

pub use infrastructure::{S3StorageConfig, S3VideoStorage};

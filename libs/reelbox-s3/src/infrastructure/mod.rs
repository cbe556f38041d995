mod s3_storage;

pub use s3_storage::{S3StorageConfig, S3VideoStorage};

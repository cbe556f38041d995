//! S3 Video Storage Implementation
//!
//! This module implements the `VideoStorage` port using AWS S3 (or any
//! S3-compatible store such as MinIO or LocalStack) as the backend. AWS SDK
//! errors are converted to `VideoError::StorageUnavailable`.

use std::future::Future;
use std::time::Duration;

use aws_sdk_s3::{
    config::{BehaviorVersion, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};
use reelbox_domain::{
    ports::VideoStorage,
    video::{Result, VideoSource},
    VideoError,
};
use tracing::{debug, error, info, info_span, Instrument};

/// Connection settings for [`S3VideoStorage`]
#[derive(Debug, Clone)]
pub struct S3StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint; enables path-style addressing when set
    pub endpoint_url: Option<String>,
}

/// S3-based implementation of the VideoStorage port
///
/// Objects are written with a single `PutObject`, which S3 applies
/// atomically: readers either see the complete object or nothing.
#[derive(Clone)]
pub struct S3VideoStorage {
    client: Client,
    bucket: String,
}

impl S3VideoStorage {
    /// Create a new S3 video storage from a configured client
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aws_sdk_s3::Client;
    /// use reelbox_s3::S3VideoStorage;
    ///
    /// # async fn example() {
    /// let config = aws_config::load_from_env().await;
    /// let storage = S3VideoStorage::new(Client::new(&config), "video-uploads".to_string());
    /// # }
    /// ```
    pub fn new(client: Client, bucket: String) -> Self {
        info!(bucket = %bucket, "Initializing S3VideoStorage");
        Self { client, bucket }
    }

    /// Build the client from the default AWS credential chain
    pub async fn connect(config: S3StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        // Path-style addressing is required by MinIO and LocalStack
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self::new(Client::from_conf(s3_config), config.bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn storage_path(bucket: &str, key: &str) -> String {
        format!("s3://{}/{}", bucket, key)
    }

    /// Request body for `source`; file sources are streamed from disk
    async fn body(source: VideoSource) -> Result<ByteStream> {
        match source {
            VideoSource::Memory(data) => Ok(ByteStream::from(data)),
            VideoSource::File(path) => ByteStream::from_path(&path).await.map_err(|err| {
                error!(path = %path.display(), error = %err, "Failed to open spooled upload");
                VideoError::storage_unavailable(format!(
                    "cannot stream '{}': {}",
                    path.display(),
                    err
                ))
            }),
        }
    }
}

impl VideoStorage for S3VideoStorage {
    fn upload(
        &self,
        source: VideoSource,
        key: &str,
        content_type: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = key.to_string();
        let content_type = content_type.to_string();
        let span = info_span!("s3.upload", key = %key, spooled = source.path().is_some());

        async move {
            debug!(bucket = %bucket, "Uploading video to S3");
            let body = Self::body(source).await?;

            match client
                .put_object()
                .bucket(&bucket)
                .key(&key)
                .content_type(content_type)
                .body(body)
                .send()
                .await
            {
                Ok(_) => {
                    info!(key = %key, "Successfully uploaded video to S3");
                    Ok(Self::storage_path(&bucket, &key))
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to upload video to S3");
                    Err(VideoError::storage_unavailable(format!(
                        "S3 put_object failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
        .instrument(span)
    }

    fn retrieval_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> impl Future<Output = Result<String>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = key.to_string();
        let span = info_span!("s3.retrieval_url", key = %key);

        async move {
            let presigning = PresigningConfig::expires_in(expires_in).map_err(|err| {
                VideoError::storage_unavailable(format!("Invalid presign expiry: {}", err))
            })?;

            match client
                .get_object()
                .bucket(&bucket)
                .key(&key)
                .presigned(presigning)
                .await
            {
                Ok(request) => {
                    debug!(key = %key, "Generated presigned URL");
                    Ok(request.uri().to_string())
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to presign S3 object");
                    Err(VideoError::storage_unavailable(format!(
                        "S3 presign failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
        .instrument(span)
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<bool>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = key.to_string();
        let span = info_span!("s3.delete", key = %key);

        async move {
            debug!(bucket = %bucket, "Deleting video from S3");

            // DeleteObject succeeds for missing keys, so a repeat delete is a no-op
            match client
                .delete_object()
                .bucket(&bucket)
                .key(&key)
                .send()
                .await
            {
                Ok(_) => {
                    info!(key = %key, "Successfully deleted video from S3");
                    Ok(true)
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to delete video from S3");
                    Err(VideoError::storage_unavailable(format!(
                        "S3 delete_object failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
        .instrument(span)
    }
}

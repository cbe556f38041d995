//! Spooling multipart uploads to disk
//!
//! Upload bodies are written chunk by chunk to a temporary file, so memory
//! use per request stays bounded by the multipart chunk size rather than the
//! video size.

use std::io;
use std::path::Path;

use axum::extract::multipart::Field;
use tempfile::{Builder, NamedTempFile, TempPath};
use tokio::{fs::File, io::AsyncWriteExt};

use crate::error::ApiError;

/// Upload body stored in a temporary file
///
/// Writing stops once more than `limit` bytes have arrived; `size` still
/// reports what was received so the upload workflow can reject it. The
/// file is removed when the value is dropped.
pub struct SpooledFile {
    file: File,
    path: TempPath,
    size: u64,
    limit: u64,
}

impl SpooledFile {
    pub async fn create(limit: u64) -> io::Result<Self> {
        let (file, path) = tokio::task::spawn_blocking(|| {
            Builder::new()
                .prefix("reelbox-upload-")
                .tempfile()
                .map(NamedTempFile::into_parts)
        })
        .await
        .map_err(io::Error::other)??;

        Ok(Self {
            file: File::from_std(file),
            path,
            size: 0,
            limit,
        })
    }

    /// Append a chunk
    ///
    /// Returns `false`, without writing, once the limit is exceeded.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<bool> {
        self.size += chunk.len() as u64;
        if self.exceeded() {
            return Ok(false);
        }
        self.file.write_all(chunk).await?;
        Ok(true)
    }

    /// Drain a multipart field into the file
    pub async fn copy_field(&mut self, field: &mut Field<'_>) -> Result<(), ApiError> {
        while let Some(chunk) = field.chunk().await? {
            if !self.write_chunk(&chunk).await? {
                break;
            }
        }
        self.file.flush().await?;
        Ok(())
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn exceeded(&self) -> bool {
        self.size > self.limit
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chunks_are_written_in_order() {
        let mut spool = SpooledFile::create(1024).await.unwrap();

        assert!(spool.write_chunk(b"first ").await.unwrap());
        assert!(spool.write_chunk(b"second").await.unwrap());
        spool.file.flush().await.unwrap();

        assert_eq!(spool.size(), 12);
        assert!(!spool.exceeded());
        assert_eq!(tokio::fs::read(spool.path()).await.unwrap(), b"first second");
    }

    #[tokio::test]
    async fn test_writing_stops_past_the_limit() {
        let mut spool = SpooledFile::create(8).await.unwrap();

        assert!(spool.write_chunk(b"12345678").await.unwrap());
        assert!(!spool.write_chunk(b"9").await.unwrap());
        spool.file.flush().await.unwrap();

        assert_eq!(spool.size(), 9);
        assert!(spool.exceeded());
        assert_eq!(tokio::fs::read(spool.path()).await.unwrap(), b"12345678");
    }

    #[tokio::test]
    async fn test_file_is_removed_on_drop() {
        let spool = SpooledFile::create(8).await.unwrap();
        let path = spool.path().to_path_buf();
        assert!(path.exists());

        drop(spool);

        assert!(!path.exists());
    }
}

//! Upload payloads handed to the storage port

use std::path::{Path, PathBuf};

use bytes::Bytes;

/// Bytes of an uploaded video
///
/// The HTTP layer spools uploads to a local file and passes its path; the
/// file must stay in place until the storage port returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    Memory(Bytes),
    File(PathBuf),
}

impl VideoSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Memory(_) => None,
            Self::File(path) => Some(path),
        }
    }
}

impl From<Bytes> for VideoSource {
    fn from(data: Bytes) -> Self {
        Self::Memory(data)
    }
}

impl From<&'static [u8]> for VideoSource {
    fn from(data: &'static [u8]) -> Self {
        Self::Memory(Bytes::from_static(data))
    }
}

impl From<Vec<u8>> for VideoSource {
    fn from(data: Vec<u8>) -> Self {
        Self::Memory(Bytes::from(data))
    }
}

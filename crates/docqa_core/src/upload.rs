//! crates/docqa_core/src/upload.rs
//!
//! The file handed to the session at the upload boundary.

use bytes::Bytes;
use std::path::PathBuf;

use crate::domain::PDF_MIME_TYPE;
use crate::error::{DocQaError, DocQaResult};

/// Where the bytes of an upload live.
#[derive(Debug, Clone)]
pub enum FileSource {
    Memory(Bytes),
    Path(PathBuf),
}

/// A single submitted file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub source: FileSource,
}

impl UploadedFile {
    pub fn from_bytes(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            source: FileSource::Memory(bytes.into()),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled.pdf".to_string());
        Self {
            file_name,
            mime_type: mime_type.into(),
            source: FileSource::Path(path),
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == PDF_MIME_TYPE
    }

    /// Reads the full contents of the file.
    ///
    /// In-memory sources are a cheap clone; path sources hit the filesystem
    /// and surface any failure as `SourceReadFailure`.
    pub async fn read(&self) -> DocQaResult<Bytes> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|e| DocQaError::SourceReadFailure(format!("{}: {}", path.display(), e))),
        }
    }
}

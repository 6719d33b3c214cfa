//! Persisted document content

use async_trait::async_trait;

use crate::error::DocumentError;
use crate::models::lsp::uri_to_path;

/// Reads the on-disk content behind a document URI (used by didSave).
#[async_trait]
pub trait ContentLoader: Send + Sync {
    async fn load(&self, uri: &str) -> Result<String, DocumentError>;
}

/// Loads `file://` URIs from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentLoader;

#[async_trait]
impl ContentLoader for FsContentLoader {
    async fn load(&self, uri: &str) -> Result<String, DocumentError> {
        let path = uri_to_path(uri).ok_or_else(|| DocumentError::NotFound(uri.to_string()))?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| DocumentError::Io {
                uri: uri.to_string(),
                source,
            })
    }
}

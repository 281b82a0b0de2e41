use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::{ArtifactStore, StorageError, StorageUri};

/// `file://` backend, used for local runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

#[async_trait]
impl ArtifactStore for LocalStore {
    async fn put(&self, source: &Path, uri: &StorageUri) -> Result<(), StorageError> {
        let StorageUri::File { path } = uri else {
            return Err(StorageError::InvalidUri { uri: uri.to_string(), reason: "not a file:// path".into() });
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = tokio::fs::copy(source, path).await?;
        info!("Copied {} bytes to {}", bytes, path.display());
        Ok(())
    }

    async fn get(&self, uri: &StorageUri) -> Result<Vec<u8>, StorageError> {
        let StorageUri::File { path } = uri else {
            return Err(StorageError::InvalidUri { uri: uri.to_string(), reason: "not a file:// path".into() });
        };
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(uri.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let uri = StorageUri::File { path: dir.path().join("absent.json") };
        let err = LocalStore.get(&uri).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_put_missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let uri = StorageUri::File { path: dir.path().join("dest.json") };
        let err = LocalStore.put(&dir.path().join("absent.json"), &uri).await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}

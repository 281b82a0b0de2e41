//! Artifact storage for trained models.
//!
//! A [`StorageUri`] names one object. [`Storage`] routes it to the backend for
//! its scheme:
//!
//! - `gs://bucket/key` - Google Cloud Storage JSON API ([`GcsStore`])
//! - `file:///path` - the local filesystem ([`LocalStore`])

mod gcs;
mod local;
mod uri;

pub use gcs::GcsStore;
pub use local::LocalStore;
pub use uri::StorageUri;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from artifact upload or download.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage path {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Storage returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A place that can hold a single artifact object.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Copies the local file at `source` to `uri`.
    async fn put(&self, source: &Path, uri: &StorageUri) -> Result<(), StorageError>;

    /// Reads the full object at `uri`.
    async fn get(&self, uri: &StorageUri) -> Result<Vec<u8>, StorageError>;
}

/// Dispatches to the backend matching a URI's scheme.
#[derive(Debug, Clone, Default)]
pub struct Storage {
    gcs: GcsStore,
    local: LocalStore,
}

impl Storage {
    pub fn new(gcs: GcsStore) -> Self {
        Self { gcs, local: LocalStore }
    }

    /// GCS endpoint and token come from `GCS_ENDPOINT` / `GCS_ACCESS_TOKEN`.
    pub fn from_env() -> Self {
        Self::new(GcsStore::from_env())
    }

    fn backend(&self, uri: &StorageUri) -> &dyn ArtifactStore {
        match uri {
            StorageUri::Gcs { .. } => &self.gcs,
            StorageUri::File { .. } => &self.local,
        }
    }
}

#[async_trait]
impl ArtifactStore for Storage {
    async fn put(&self, source: &Path, uri: &StorageUri) -> Result<(), StorageError> {
        self.backend(uri).put(source, uri).await
    }

    async fn get(&self, uri: &StorageUri) -> Result<Vec<u8>, StorageError> {
        self.backend(uri).get(uri).await
    }
}

use std::env;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use tracing::info;

use crate::{ArtifactStore, StorageError, StorageUri};

const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";
const ENDPOINT_KEY: &str = "GCS_ENDPOINT";
const TOKEN_KEY: &str = "GCS_ACCESS_TOKEN";

/// Google Cloud Storage over the JSON API with a bearer token.
#[derive(Clone)]
pub struct GcsStore {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl fmt::Debug for GcsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcsStore")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for GcsStore {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, None)
    }
}

impl GcsStore {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        let endpoint = env::var(ENDPOINT_KEY).unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        Self::new(endpoint, env::var(TOKEN_KEY).ok())
    }

    fn token(&self) -> Result<&str, StorageError> {
        self.token
            .as_deref()
            .ok_or_else(|| StorageError::MissingCredentials(format!("{TOKEN_KEY} is not set")))
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StorageError> {
        let invalid = |reason: String| StorageError::InvalidUri { uri: self.endpoint.clone(), reason };
        let mut url = Url::parse(&self.endpoint).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn gcs_parts(uri: &StorageUri) -> Result<(&str, &str), StorageError> {
    match uri {
        StorageUri::Gcs { bucket, key } => Ok((bucket, key)),
        other => Err(StorageError::InvalidUri { uri: other.to_string(), reason: "not a gs:// path".into() }),
    }
}

async fn check(response: reqwest::Response, uri: &StorageUri) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(StorageError::NotFound(uri.to_string()));
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Status { status: status.as_u16(), body })
}

#[async_trait]
impl ArtifactStore for GcsStore {
    async fn put(&self, source: &Path, uri: &StorageUri) -> Result<(), StorageError> {
        let (bucket, key) = gcs_parts(uri)?;
        let token = self.token()?;
        let body = tokio::fs::read(source).await?;
        let size = body.len();

        let mut url = self.url(&["upload", "storage", "v1", "b", bucket, "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?;
        check(response, uri).await?;

        info!("Uploaded {} bytes to {}", size, uri);
        Ok(())
    }

    async fn get(&self, uri: &StorageUri) -> Result<Vec<u8>, StorageError> {
        let (bucket, key) = gcs_parts(uri)?;
        let token = self.token()?;

        let mut url = self.url(&["storage", "v1", "b", bucket, "o", key])?;
        url.query_pairs_mut().append_pair("alt", "media");

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let bytes = check(response, uri).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

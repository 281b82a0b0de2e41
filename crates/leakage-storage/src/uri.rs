use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::StorageError;

const GCS_SCHEME: &str = "gs://";
const FILE_SCHEME: &str = "file://";

/// Location of a single stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageUri {
    Gcs { bucket: String, key: String },
    File { path: PathBuf },
}

impl FromStr for StorageUri {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| StorageError::InvalidUri { uri: s.to_string(), reason: reason.to_string() };

        if let Some(rest) = s.strip_prefix(GCS_SCHEME) {
            let (bucket, key) = rest
                .split_once('/')
                .ok_or_else(|| invalid("expected gs://bucket/key"))?;
            if bucket.is_empty() {
                return Err(invalid("bucket name is empty"));
            }
            if key.is_empty() {
                return Err(invalid("object key is empty"));
            }
            return Ok(StorageUri::Gcs { bucket: bucket.to_string(), key: key.to_string() });
        }

        if let Some(rest) = s.strip_prefix(FILE_SCHEME) {
            if rest.is_empty() {
                return Err(invalid("file path is empty"));
            }
            return Ok(StorageUri::File { path: PathBuf::from(rest) });
        }

        Err(invalid("path must start with gs:// or file://"))
    }
}

impl fmt::Display for StorageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageUri::Gcs { bucket, key } => write!(f, "{GCS_SCHEME}{bucket}/{key}"),
            StorageUri::File { path } => write!(f, "{FILE_SCHEME}{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gcs() {
        let uri: StorageUri = "gs://ml-models/claims/leakage/model.json".parse().unwrap();
        assert_eq!(
            uri,
            StorageUri::Gcs { bucket: "ml-models".into(), key: "claims/leakage/model.json".into() }
        );
        assert_eq!(uri.to_string(), "gs://ml-models/claims/leakage/model.json");
    }

    #[test]
    fn test_parse_file() {
        let uri: StorageUri = "file:///tmp/model.json".parse().unwrap();
        assert_eq!(uri, StorageUri::File { path: PathBuf::from("/tmp/model.json") });
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["s3://bucket/key", "bucket/key", "gs://bucket", "gs://bucket/", "gs:///key", "file://", ""] {
            let err = bad.parse::<StorageUri>().unwrap_err();
            assert!(matches!(err, StorageError::InvalidUri { .. }), "{bad} should be invalid");
        }
    }
}

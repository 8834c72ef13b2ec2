/**
 * File Store
 *
 * A thin layer over `object_store`. Objects are keyed by their file name,
 * under an optional folder prefix. Names must be a single path segment.
 *
 * Removing a missing object succeeds, as S3 deletes do.
 */

use std::sync::Arc;

use axum::body::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use serde::Serialize;

use crate::backend::error::BackendError;
use crate::shared::config::StorageSettings;
use crate::shared::ConfigError;

/// Result of a successful upload
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Empty when the bucket is not versioned
    pub version_id: String,
    pub object_id: String,
    pub bucket: String,
}

#[derive(Clone)]
pub struct FileStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    folder: Option<String>,
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("store", &self.store.to_string())
            .field("bucket", &self.bucket)
            .field("folder", &self.folder)
            .finish()
    }
}

impl FileStore {
    /// Process-local bucket
    pub fn memory(bucket: impl Into<String>) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            bucket: bucket.into(),
            folder: None,
        }
    }

    /// S3 bucket at `settings.url`, or memory when no url is set
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, ConfigError> {
        let Some(url) = &settings.url else {
            tracing::info!("S3_URL not set, keeping files in memory");
            return Ok(Self {
                folder: settings.folder.clone(),
                ..Self::memory(settings.bucket.clone())
            });
        };

        let (Some(access_key), Some(secret_key)) = (&settings.access_key, &settings.secret_key)
        else {
            return Err(ConfigError::MissingValue("S3_ACCESS_KEY and S3_SECRET_KEY"));
        };

        let s3 = AmazonS3Builder::new()
            .with_endpoint(url)
            .with_allow_http(url.starts_with("http://"))
            .with_access_key_id(access_key)
            .with_secret_access_key(secret_key)
            .with_region(&settings.region)
            .with_bucket_name(&settings.bucket)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("S3 storage: {}", e)))?;

        tracing::info!("File storage: bucket {} at {}", settings.bucket, url);
        Ok(Self {
            store: Arc::new(s3),
            bucket: settings.bucket.clone(),
            folder: settings.folder.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub async fn upload(&self, name: &str, data: Bytes) -> Result<UploadResponse, BackendError> {
        let location = self.location(name)?;
        let size = data.len();
        let result = self
            .store
            .put(&location, PutPayload::from(data))
            .await
            .map_err(|e| storage_error(name, e))?;

        tracing::info!("File uploaded: {} ({} bytes) to {}", location, size, self.bucket);
        Ok(UploadResponse {
            version_id: result.version.unwrap_or_default(),
            object_id: location.to_string(),
            bucket: self.bucket.clone(),
        })
    }

    pub async fn download(&self, name: &str) -> Result<Bytes, BackendError> {
        let location = self.location(name)?;
        let object = self
            .store
            .get(&location)
            .await
            .map_err(|e| storage_error(name, e))?;
        object.bytes().await.map_err(|e| storage_error(name, e))
    }

    pub async fn remove(&self, name: &str) -> Result<(), BackendError> {
        let location = self.location(name)?;
        match self.store.delete(&location).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => {
                tracing::info!("File removed: {} from {}", location, self.bucket);
                Ok(())
            }
            Err(e) => Err(storage_error(name, e)),
        }
    }

    fn location(&self, name: &str) -> Result<ObjectPath, BackendError> {
        if name.trim().is_empty()
            || name.contains('/')
            || name == "."
            || name == ".."
            || name.chars().any(char::is_control)
        {
            return Err(BackendError::validation(format!("Invalid file name: {:?}", name)));
        }
        let key = match &self.folder {
            Some(folder) => format!("{}/{}", folder.trim_matches('/'), name),
            None => name.to_string(),
        };
        ObjectPath::parse(&key)
            .map_err(|e| BackendError::validation(format!("Invalid file name {:?}: {}", name, e)))
    }
}

fn storage_error(name: &str, err: object_store::Error) -> BackendError {
    match err {
        object_store::Error::NotFound { .. } => BackendError::FileNotFound(name.to_string()),
        other => BackendError::Internal(format!("object store: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_upload_download_remove() {
        let files = FileStore::memory("uploads");
        let uploaded = files
            .upload("report.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert_eq!(uploaded.object_id, "report.txt");
        assert_eq!(uploaded.bucket, "uploads");
        assert_eq!(uploaded.version_id, "");

        assert_eq!(files.download("report.txt").await.unwrap(), Bytes::from_static(b"hello"));

        files.remove("report.txt").await.unwrap();
        files.remove("report.txt").await.unwrap();
        assert_matches!(
            files.download("report.txt").await,
            Err(BackendError::FileNotFound(name)) if name == "report.txt"
        );
    }

    #[tokio::test]
    async fn test_folder_prefixes_keys() {
        let files = FileStore::from_settings(&StorageSettings {
            folder: Some("/inbox/".to_string()),
            ..StorageSettings::default()
        })
        .unwrap();
        let uploaded = files.upload("a.bin", Bytes::from_static(&[1, 2])).await.unwrap();
        assert_eq!(uploaded.object_id, "inbox/a.bin");
        assert_eq!(files.download("a.bin").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rejects_names_that_are_not_one_segment() {
        let files = FileStore::memory("uploads");
        for name in ["", "  ", "a/b", "..", "line\nbreak"] {
            assert_matches!(
                files.upload(name, Bytes::new()).await,
                Err(BackendError::Validation(_)),
                "{:?}",
                name
            );
        }
    }

    #[test]
    fn test_s3_settings_need_credentials() {
        let settings = StorageSettings {
            url: Some("http://localhost:9000".to_string()),
            ..StorageSettings::default()
        };
        assert!(FileStore::from_settings(&settings).is_err());

        let settings = StorageSettings {
            access_key: Some("minio".to_string()),
            secret_key: Some("minio123".to_string()),
            ..settings
        };
        assert_eq!(FileStore::from_settings(&settings).unwrap().bucket(), "userhub");
    }
}

//! Disk-backed blob storage for uploaded files.
//!
//! Uploads are written under a fresh UUID filename and addressed by a
//! public URL (`<base>/files/<id>`) that the API's download route serves.
//! The store never inspects the bytes; attachment metadata (name, size,
//! MIME) lives in the database.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServerError;

/// Verify that a resolved path stays within the expected base directory.
/// Prevents path traversal attacks.
fn ensure_within(base: &Path, target: &Path) -> Result<PathBuf, ServerError> {
    // Canonicalize base; target may not exist yet so normalize manually
    let canonical_base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());
    let mut resolved = canonical_base.clone();
    for component in target
        .strip_prefix(&canonical_base)
        .unwrap_or(target)
        .components()
    {
        match component {
            std::path::Component::Normal(c) => resolved.push(c),
            std::path::Component::ParentDir => {
                return Err(ServerError::BadRequest(
                    "Path traversal detected".to_string(),
                ));
            }
            _ => {} // RootDir, CurDir, Prefix — skip
        }
    }
    if !resolved.starts_with(&canonical_base) {
        return Err(ServerError::BadRequest(
            "Path traversal detected".to_string(),
        ));
    }
    Ok(resolved)
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Public URL the stored bytes can be fetched from.
    pub url: String,
    /// Size of the stored payload in bytes.
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct BlobStore {
    base_path: PathBuf,
    base_url: String,
    max_size: usize,
}

impl BlobStore {
    pub async fn new(
        base_path: PathBuf,
        base_url: String,
        max_size: usize,
    ) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::UploadFailed(format!(
                "Failed to create blob directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Blob store initialized");

        Ok(Self {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_size,
        })
    }

    /// Store an uploaded payload and return its public URL and size.
    pub async fn store(
        &self,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<StoredBlob, ServerError> {
        if data.is_empty() {
            return Err(ServerError::UploadFailed("Empty upload".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ServerError::PayloadTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let id = Uuid::new_v4();
        let path = self.safe_blob_path(&id)?;

        fs::write(&path, data)
            .await
            .map_err(|e| ServerError::UploadFailed(format!("Failed to write blob {}: {}", id, e)))?;

        debug!(
            id = %id,
            size = data.len(),
            content_type = content_type.unwrap_or("unknown"),
            "Stored blob"
        );

        Ok(StoredBlob {
            url: format!("{}/files/{}", self.base_url, id),
            size: data.len(),
        })
    }

    /// Read stored bytes back for serving.
    pub async fn read(&self, id: Uuid) -> Result<Vec<u8>, ServerError> {
        let path = self.safe_blob_path(&id)?;

        if !path.exists() {
            return Err(ServerError::NotFound);
        }

        let data = fs::read(&path)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to read blob {}: {}", id, e)))?;

        debug!(id = %id, size = data.len(), "Retrieved blob");
        Ok(data)
    }

    /// Safe blob path that validates against traversal.
    fn safe_blob_path(&self, id: &Uuid) -> Result<PathBuf, ServerError> {
        let raw = self.base_path.join(id.to_string());
        ensure_within(&self.base_path, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (BlobStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::new(
            dir.path().to_path_buf(),
            "http://localhost:8080".to_string(),
            1024 * 1024,
        )
        .await
        .unwrap();
        (store, dir)
    }

    fn id_from_url(url: &str) -> Uuid {
        url.rsplit('/').next().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_store_and_read() {
        let (store, _dir) = test_store().await;
        let data = b"uploaded-file-bytes";

        let stored = store.store(data, Some("text/plain")).await.unwrap();
        assert_eq!(stored.size, data.len());
        assert!(stored.url.starts_with("http://localhost:8080/files/"));

        let retrieved = store.read(id_from_url(&stored.url)).await.unwrap();
        assert_eq!(retrieved, data);
    }

    #[tokio::test]
    async fn test_not_found() {
        let (store, _dir) = test_store().await;
        let missing = Uuid::new_v4();
        assert!(matches!(
            store.read(missing).await,
            Err(ServerError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let (store, _dir) = test_store().await;
        assert!(store.store(b"", None).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::new(
            dir.path().to_path_buf(),
            "http://localhost:8080".to_string(),
            4,
        )
        .await
        .unwrap();

        assert!(matches!(
            store.store(b"too big", None).await,
            Err(ServerError::PayloadTooLarge { size: 7, max: 4 })
        ));
    }
}

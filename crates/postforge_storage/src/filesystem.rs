//! Filesystem blob store.
//!
//! One file per key, named by the SHA-256 of the key so arbitrary scope
//! strings never reach the filesystem as path components.

use async_trait::async_trait;
use postforge_error::{PostforgeResult, StorageError, StorageErrorKind};
use postforge_interface::BlobStore;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use uuid::Uuid;

/// Filesystem blob store.
///
/// Layout: `{base_path}/{hash[0:2]}/{hash}.blob`
///
/// Writes go to a uniquely named temp file in the same directory and are
/// renamed over the target, so readers never see a partial blob.
#[derive(Debug, Clone)]
pub struct FileSystemBlobStore {
    base_path: PathBuf,
}

impl FileSystemBlobStore {
    /// Create a store rooted at `base_path`.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> PostforgeResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem blob store");
        Ok(Self { base_path })
    }

    /// Root directory.
    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    fn hash_key(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let hash = Self::hash_key(key);
        self.base_path
            .join(&hash[0..2])
            .join(format!("{}.blob", hash))
    }
}

#[async_trait]
impl BlobStore for FileSystemBlobStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> PostforgeResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(data) => {
                tracing::debug!(path = %path.display(), size = data.len(), "Read blob");
                Ok(Some(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::new(StorageErrorKind::Read(format!(
                "{}: {}",
                path.display(),
                e
            ))))?,
        }
    }

    #[tracing::instrument(skip(self, blob), fields(size = blob.len()))]
    async fn set(&self, key: &str, blob: Vec<u8>) -> PostforgeResult<()> {
        let path = self.path_for(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Unique temp name so concurrent writers of one key never share a file
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&temp_path, &blob).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            Err(StorageError::new(StorageErrorKind::Write(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))))?
        }

        tracing::debug!(path = %path.display(), size = blob.len(), "Wrote blob");
        Ok(())
    }
}

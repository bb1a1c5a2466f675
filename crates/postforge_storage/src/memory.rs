//! In-memory blob store.

use async_trait::async_trait;
use postforge_error::PostforgeResult;
use postforge_interface::BlobStore;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Blob store backed by a process-local map.
///
/// Contents vanish with the process. Useful for tests and single-shot CLI runs.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// True when nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, key: &str) -> PostforgeResult<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, blob: Vec<u8>) -> PostforgeResult<()> {
        self.blobs.write().await.insert(key.to_string(), blob);
        Ok(())
    }
}

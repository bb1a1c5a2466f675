//! Learning state store: process cache over an optional blob store.

use async_trait::async_trait;
use postforge_core::LearningState;
use postforge_error::{JsonError, PostforgeResult};
use postforge_interface::{BlobStore, StateStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, warn};

/// [`StateStore`] with a process-local cache and best-effort persistence.
///
/// The cache lock is only held for map access, never across an await.
/// Without a blob store the state lives as long as the process.
#[derive(Default)]
pub struct LearningStore {
    cache: Mutex<HashMap<String, LearningState>>,
    blobs: Option<Arc<dyn BlobStore>>,
}

impl LearningStore {
    /// Memory-only store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store persisting through `blobs`.
    pub fn with_blob_store(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            blobs: Some(blobs),
        }
    }

    /// True when a blob store backs this store.
    pub fn is_persistent(&self) -> bool {
        self.blobs.is_some()
    }

    /// Blob key for a scope.
    pub fn blob_key(scope: &str) -> String {
        format!("learning:{}", scope)
    }

    fn cached(&self, scope: &str) -> Option<LearningState> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(scope)
            .cloned()
    }

    fn remember(&self, scope: &str, state: LearningState) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(scope.to_string(), state);
    }

    async fn fetch(&self, blobs: &dyn BlobStore, scope: &str) -> LearningState {
        let key = Self::blob_key(scope);
        match blobs.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<LearningState>(&bytes) {
                Ok(state) => state,
                Err(e) => {
                    warn!(scope, error = %e, "Corrupt learning state, starting fresh");
                    LearningState::default()
                }
            },
            Ok(None) => {
                debug!(scope, "No persisted learning state");
                LearningState::default()
            }
            Err(e) => {
                warn!(scope, error = %e, "Failed to load learning state, starting fresh");
                LearningState::default()
            }
        }
    }
}

#[async_trait]
impl StateStore for LearningStore {
    #[instrument(skip(self))]
    async fn load(&self, scope: &str) -> LearningState {
        if let Some(state) = self.cached(scope) {
            return state;
        }

        let state = match &self.blobs {
            Some(blobs) => self.fetch(blobs.as_ref(), scope).await,
            None => LearningState::default(),
        };

        // Another request may have populated the cache while we were loading
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.entry(scope.to_string()).or_insert(state).clone()
    }

    #[instrument(skip(self, state), fields(topics = state.topic_stats.len(), titles = state.recent_titles.len()))]
    async fn save(&self, scope: &str, state: LearningState) -> PostforgeResult<()> {
        let Some(blobs) = &self.blobs else {
            self.remember(scope, state);
            return Ok(());
        };

        let bytes = serde_json::to_vec(&state).map_err(JsonError::from)?;
        self.remember(scope, state);
        blobs.set(&Self::blob_key(scope), bytes).await
    }
}

impl std::fmt::Debug for LearningStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningStore")
            .field("persistent", &self.is_persistent())
            .finish()
    }
}

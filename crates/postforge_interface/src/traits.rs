//! Collaborator traits.

use async_trait::async_trait;
use postforge_core::{CompletionRequest, CompletionResponse, LearningState};
use postforge_error::PostforgeResult;

/// A chat completion provider.
///
/// Implementations perform exactly one call per invocation. Retry, timeout
/// and deadline handling live above this trait.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Run one completion.
    ///
    /// # Errors
    ///
    /// Returns an upstream error for transport failures and non-success
    /// responses, or a configuration error when credentials are missing.
    async fn complete(&self, req: &CompletionRequest) -> PostforgeResult<CompletionResponse>;

    /// Provider name (e.g., "openrouter").
    fn provider_name(&self) -> &'static str;

    /// Model used when a request names none.
    fn model_name(&self) -> &str;
}

/// Opaque key-value blob persistence.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch a blob. `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> PostforgeResult<Option<Vec<u8>>>;

    /// Store a blob, replacing any previous value.
    async fn set(&self, key: &str, blob: Vec<u8>) -> PostforgeResult<()>;
}

/// Owner of per-scope [`LearningState`].
///
/// Consistency is eventual. `load` hands out a snapshot and `save` replaces
/// the whole state, so two requests for the same scope that overlap in time
/// may lose one another's counter updates. Callers accept that loss; rotation
/// only needs approximate fairness.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Snapshot of the state for `scope`, empty when nothing is known.
    ///
    /// Never fails: unreadable persisted state degrades to the default.
    async fn load(&self, scope: &str) -> LearningState;

    /// Replace the state for `scope`.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backing store rejects the write. The
    /// in-process copy is updated regardless.
    async fn save(&self, scope: &str, state: LearningState) -> PostforgeResult<()>;
}

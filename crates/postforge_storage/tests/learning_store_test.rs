//! Tests for the learning state store.

use postforge_core::LearningState;
use postforge_interface::{BlobStore, StateStore};
use postforge_storage::{FileSystemBlobStore, InMemoryBlobStore, LearningStore};
use std::sync::Arc;
use tempfile::TempDir;

fn sample_state() -> LearningState {
    let mut state = LearningState::default();
    state.topic_stats.insert("fee burn".to_string(), 4);
    state.format_stats.insert("list".to_string(), 2);
    state.record_fingerprint("0123456789abcdef".to_string(), 48);
    state
}

#[tokio::test]
async fn test_unknown_scope_loads_default() {
    let store = LearningStore::new();
    assert_eq!(store.load("ETH").await, LearningState::default());
    assert!(!store.is_persistent());
}

#[tokio::test]
async fn test_memory_only_store_keeps_state_in_process() -> anyhow::Result<()> {
    let store = LearningStore::new();
    store.save("ETH", sample_state()).await?;
    assert_eq!(store.load("ETH").await, sample_state());
    Ok(())
}

#[tokio::test]
async fn test_state_survives_a_new_store_instance() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let blobs: Arc<dyn BlobStore> = Arc::new(FileSystemBlobStore::new(temp_dir.path())?);

    let first = LearningStore::with_blob_store(blobs.clone());
    first.save("SOL", sample_state()).await?;

    let second = LearningStore::with_blob_store(blobs);
    assert_eq!(second.load("SOL").await, sample_state());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_blob_degrades_to_default() -> anyhow::Result<()> {
    let blobs = Arc::new(InMemoryBlobStore::new());
    blobs
        .set(&LearningStore::blob_key("BTC"), b"not json".to_vec())
        .await?;

    let store = LearningStore::with_blob_store(blobs);
    assert_eq!(store.load("BTC").await, LearningState::default());
    Ok(())
}

#[tokio::test]
async fn test_scopes_are_independent() -> anyhow::Result<()> {
    let store = LearningStore::with_blob_store(Arc::new(InMemoryBlobStore::new()));
    store.save("BTC", sample_state()).await?;
    assert_eq!(store.load("ETH").await, LearningState::default());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_saves_keep_one_whole_state() -> anyhow::Result<()> {
    let store = Arc::new(LearningStore::with_blob_store(Arc::new(
        InMemoryBlobStore::new(),
    )));

    let mut handles = Vec::new();
    for i in 0..8u64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let mut state = store.load("BTC").await;
            state.topic_cursor = i;
            store.save("BTC", state).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    // Last writer wins; some updates are lost, but the state is never torn.
    let state = store.load("BTC").await;
    assert!(state.topic_cursor < 8);
    Ok(())
}

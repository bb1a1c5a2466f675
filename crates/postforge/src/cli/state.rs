//! `state` command handler.

use postforge::{JsonError, PostforgeResult, StateStore, StorageBackend, build_store, load_config};
use std::path::Path;
use tracing::warn;

/// Print the learning state for `token` as JSON.
pub async fn handle_state(token: &str, config_path: Option<&Path>) -> PostforgeResult<()> {
    let config = load_config(config_path)?;
    if config.storage.backend == StorageBackend::Memory {
        warn!("Storage backend is memory, state from earlier runs is not available");
    }

    let store = build_store(&config.storage)?;
    let scope = token.trim().trim_start_matches('$').to_ascii_uppercase();
    let state = store.load(&scope).await;

    let json = serde_json::to_string_pretty(&state).map_err(|e| JsonError::new(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

//! Configuration loading and store wiring.

use postforge::{
    LearningState, StateStore, StorageBackend, StorageConfig, build_store, load_config,
};
use std::io::Write;

#[test]
fn test_config_file_overrides_bundled_defaults() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        file,
        "[pipeline]\nmax_repairs = 1\nrotation_policy = \"round_robin\"\n\n[storage]\nbackend = \"filesystem\"\npath = \"/tmp/postforge-state\""
    )?;

    let config = load_config(Some(file.path()))?;

    assert_eq!(config.pipeline.max_repairs, 1);
    assert_eq!(config.pipeline.deadline_ms, 25_000);
    assert_eq!(config.storage.backend, StorageBackend::Filesystem);
    assert_eq!(config.retry.max_attempts, 3);
    Ok(())
}

#[test]
fn test_missing_config_file_is_an_error() {
    let err = load_config(Some(std::path::Path::new("/nonexistent/postforge.toml"))).unwrap_err();
    assert!(format!("{}", err).contains("does not exist"));
}

#[test]
fn test_invalid_config_is_rejected() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "[retry]\nmax_attempts = 0")?;

    assert!(load_config(Some(file.path())).is_err());
    Ok(())
}

#[tokio::test]
async fn test_filesystem_store_survives_rebuild() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = StorageConfig {
        backend: StorageBackend::Filesystem,
        path: Some(dir.path().to_path_buf()),
    };

    let mut state = LearningState::default();
    state.topic_stats.insert("fees".to_string(), 3);
    state.record_fingerprint("halving".to_string(), 48);
    build_store(&config)?.save("BTC", state.clone()).await?;

    let reloaded = build_store(&config)?.load("BTC").await;
    assert_eq!(reloaded, state);
    Ok(())
}

#[tokio::test]
async fn test_memory_store_starts_empty() -> anyhow::Result<()> {
    let store = build_store(&StorageConfig::default())?;
    assert_eq!(store.load("BTC").await, LearningState::default());
    Ok(())
}

//! Tests for the filesystem blob store.

use postforge_interface::BlobStore;
use postforge_storage::FileSystemBlobStore;
use tempfile::TempDir;

#[tokio::test]
async fn test_set_and_get() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemBlobStore::new(temp_dir.path())?;

    store.set("learning:BTC", b"{\"topic_cursor\":1}".to_vec()).await?;
    let blob = store.get("learning:BTC").await?;

    assert_eq!(blob.as_deref(), Some(&b"{\"topic_cursor\":1}"[..]));
    Ok(())
}

#[tokio::test]
async fn test_missing_key_is_none() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemBlobStore::new(temp_dir.path())?;

    assert!(store.get("learning:never-written").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_overwrite_replaces_and_leaves_no_temp_files() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemBlobStore::new(temp_dir.path())?;

    store.set("k", b"first".to_vec()).await?;
    store.set("k", b"second".to_vec()).await?;

    assert_eq!(store.get("k").await?.as_deref(), Some(&b"second"[..]));

    let path = store.path_for("k");
    let parent = path.parent().expect("blob has a parent directory");
    let entries: Vec<_> = std::fs::read_dir(parent)?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_keys_never_become_path_components() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemBlobStore::new(temp_dir.path())?;

    let path = store.path_for("../../etc/passwd");
    assert!(path.starts_with(temp_dir.path()));
    store.set("../../etc/passwd", b"x".to_vec()).await?;
    assert!(store.get("../../etc/passwd").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_creates_nested_base_directory() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let nested = temp_dir.path().join("a").join("b");
    let store = FileSystemBlobStore::new(&nested)?;
    assert!(nested.exists());
    assert_eq!(store.base_path(), nested.as_path());
    Ok(())
}

//! Wiring configuration into a ready pipeline.

use postforge_error::PostforgeResult;
use postforge_interface::{CompletionDriver, StateStore};
use postforge_pipeline::{Chooser, Pipeline, RandomChooser};
use postforge_rate_limit::{PostforgeConfig, StorageBackend, StorageConfig};
use postforge_storage::{FileSystemBlobStore, LearningStore};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Load `path` over the bundled defaults, or the usual search path when
/// no file is named.
///
/// # Errors
///
/// Returns a configuration error when a file is missing, malformed or
/// fails validation.
pub fn load_config(path: Option<&Path>) -> PostforgeResult<PostforgeConfig> {
    match path {
        Some(path) => PostforgeConfig::from_file(path),
        None => PostforgeConfig::load(),
    }
}

/// Learning store for the configured backend.
///
/// # Errors
///
/// Returns an error when the filesystem backend has no usable directory.
pub fn build_store(config: &StorageConfig) -> PostforgeResult<Arc<dyn StateStore>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Learning state kept in memory");
            Ok(Arc::new(LearningStore::new()))
        }
        StorageBackend::Filesystem => {
            let path = config.resolved_path()?;
            info!(path = %path.display(), "Learning state persisted to filesystem");
            let blobs = FileSystemBlobStore::new(path)?;
            Ok(Arc::new(LearningStore::with_blob_store(Arc::new(blobs))))
        }
    }
}

/// Pipeline over `driver` and `store`. A `seed` makes persona, template and
/// tweak choices reproducible.
pub fn build_pipeline(
    config: &PostforgeConfig,
    driver: Arc<dyn CompletionDriver>,
    store: Arc<dyn StateStore>,
    seed: Option<u64>,
) -> Pipeline {
    let chooser: Arc<dyn Chooser> = match seed {
        Some(seed) => Arc::new(RandomChooser::seeded(seed)),
        None => Arc::new(RandomChooser::from_entropy()),
    };
    Pipeline::new(driver, store, config).with_chooser(chooser)
}

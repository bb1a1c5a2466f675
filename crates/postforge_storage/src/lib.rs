//! Persistence for Postforge learning state.
//!
//! Two [`BlobStore`](postforge_interface::BlobStore) backends are provided:
//! an in-memory map and a directory of files written atomically. The
//! [`LearningStore`] sits on top of either (or neither) and implements
//! [`StateStore`](postforge_interface::StateStore) with a process-local cache.
//!
//! # Example
//!
//! ```rust
//! use postforge_interface::StateStore;
//! use postforge_storage::{InMemoryBlobStore, LearningStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = LearningStore::with_blob_store(Arc::new(InMemoryBlobStore::new()));
//!
//! let mut state = store.load("BTC").await;
//! *state.topic_stats.entry("fees".to_string()).or_default() += 1;
//! store.save("BTC", state).await?;
//!
//! assert_eq!(store.load("BTC").await.topic_usage("fees"), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod learning_store;
mod memory;

pub use filesystem::FileSystemBlobStore;
pub use learning_store::LearningStore;
pub use memory::InMemoryBlobStore;
pub use postforge_error::{StorageError, StorageErrorKind};

//! Trait definitions for the Postforge content generation pipeline.
//!
//! The pipeline talks to three collaborators through these seams: a chat
//! completion provider, an opaque key-value blob store, and the learning
//! state store layered on top of it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{BlobStore, CompletionDriver, StateStore};

//! # scribe-core
//!
//! Core types, traits, and abstractions for scribe.
//!
//! This crate provides the domain models, the in-memory entity graph that
//! keeps notebook/note/tag ownership symmetric, the store repository
//! traits, the error taxonomy, and the cache configuration the other
//! scribe crates depend on.

pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use graph::{EntityGraph, NotebookNode, NoteNode, RemovedSubgraph, TagNode};
pub use models::*;
pub use traits::*;

//! Token loading and resolution engine for tokenforge.
//!
//! This crate turns a token source directory into resolved, immutable token
//! trees: it loads the manifest and every referenced file concurrently, merges
//! per-mode files into one variable tree per collection, builds the four style
//! trees, resolves `{path}` references, and exposes the result through the
//! `TokenManager` facade with an explicit `unloaded -> loading -> loaded`
//! lifecycle.

pub mod lifecycle;
pub mod loader;
pub mod manager;
pub mod resolve;
pub mod styles;
pub mod tree;
pub mod variables;

pub use lifecycle::{validate_transition, LoadState};
pub use loader::{load_manifest, load_sources, LoadedFiles};
pub use manager::{LoadOptions, StyleTrees, TokenManager};
pub use resolve::Resolver;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error in {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: tokenforge_schema::ManifestError,
    },
    #[error("tokens not loaded; call load() first")]
    NotLoaded,
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

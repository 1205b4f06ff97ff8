//! Output generators for tokenforge.
//!
//! Each generator reads the resolved trees of a loaded
//! [`TokenManager`](tokenforge_core::TokenManager) and renders CSS, SCSS, or
//! JSON files. Generators only build [`OutputFile`]s; [`write_outputs`] puts
//! them on disk.

pub mod breakpoints;
pub mod colors;
pub mod config;
pub mod container;
pub mod css;
pub mod shadows;

pub use breakpoints::{BreakpointList, Breakpoints, StyleExtension, DEFAULT_BREAKPOINT_NAMES};
pub use colors::Colors;
pub use config::{ApiSection, ModuleConfig, ProjectConfig, CONFIG_FILE_NAME};
pub use container::Container;
pub use shadows::Shadows;

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokenforge_core::{CoreError, TokenManager};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("invalid module input: {0}")]
    InvalidInput(String),
    #[error("no grid styles loaded; declare styles.grid in the manifest")]
    NoGridStyles,
    #[error("found {found} breakpoints but only {available} names: {names}")]
    NotEnoughNames {
        found: usize,
        available: usize,
        names: String,
    },
    #[error("non-numeric breakpoint keys in grid styles: {0}")]
    NonNumericBreakpoints(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One rendered file, relative to the project root unless absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

pub trait Generator {
    /// Short label used in logs, e.g. `colors`.
    fn name(&self) -> &'static str;

    /// Render this generator's files. An empty list means there was nothing
    /// to emit.
    fn generate(&self, manager: &TokenManager) -> Result<Vec<OutputFile>, GenerateError>;
}

/// Write every output under `root`, replacing existing files atomically.
///
/// Returns the paths written, in output order.
pub fn write_outputs(root: &Path, outputs: &[OutputFile]) -> Result<Vec<PathBuf>, GenerateError> {
    let mut written = Vec::with_capacity(outputs.len());
    for output in outputs {
        let dest = root.join(&output.path);
        write_atomic(&dest, &output.contents).map_err(|source| GenerateError::Write {
            path: dest.clone(),
            source,
        })?;
        tracing::debug!("wrote {} ({} bytes)", dest.display(), output.contents.len());
        written.push(dest);
    }
    Ok(written)
}

fn write_atomic(dest: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

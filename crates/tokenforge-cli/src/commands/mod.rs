pub mod completions;
pub mod fetch;
pub mod generate;
pub mod inspect;
pub mod man_pages;
pub mod token;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokenforge_core::TokenManager;
use tokenforge_generate::{ProjectConfig, CONFIG_FILE_NAME};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_CONFIG_ERROR: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Manifest,
    Variables,
    Styles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resource {
    Styles,
    Components,
    Nodes,
}

/// Project file plus the directory its relative paths are resolved against.
#[derive(Debug)]
pub struct Project {
    pub config: ProjectConfig,
    pub root: PathBuf,
    pub tokens_dir: PathBuf,
}

impl Project {
    /// Read the project file.
    ///
    /// An explicit `--config` must exist. Without one, `tokenforge.toml` in
    /// the current directory is used when present, otherwise defaults.
    pub fn open(config: Option<&Path>, tokens: Option<&Path>) -> Result<Self, String> {
        let (config, root) = match config {
            Some(path) => {
                if !path.is_file() {
                    return Err(format!("config error: {} not found", path.display()));
                }
                (ProjectConfig::load(path).map_err(|e| e.to_string())?, parent_dir(path))
            }
            None => {
                let path = Path::new(CONFIG_FILE_NAME);
                if path.is_file() {
                    (ProjectConfig::load(path).map_err(|e| e.to_string())?, PathBuf::from("."))
                } else {
                    (ProjectConfig::default(), PathBuf::from("."))
                }
            }
        };
        let tokens_dir = match tokens {
            Some(dir) => dir.to_path_buf(),
            None => config.tokens_path(&root),
        };
        tracing::debug!("tokens directory: {}", tokens_dir.display());
        Ok(Self {
            config,
            root,
            tokens_dir,
        })
    }

    /// A manager for this project's tokens, already loaded.
    pub fn load_tokens(&self) -> Result<TokenManager, String> {
        let mut manager = TokenManager::with_options(&self.tokens_dir, self.config.load.clone());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("failed to start runtime: {e}"))?;
        runtime
            .block_on(manager.load())
            .map_err(|e| e.to_string())?;
        Ok(manager)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    if let Ok(style) = ProgressStyle::with_template("{msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    if let Ok(style) = ProgressStyle::with_template("{msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("✗ {msg}"));
}

//! The `tokenforge.toml` project file.

use crate::{BreakpointList, Breakpoints, Colors, Container, GenerateError, Generator, Shadows};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokenforge_core::LoadOptions;

pub const CONFIG_FILE_NAME: &str = "tokenforge.toml";

fn default_tokens_dir() -> PathBuf {
    PathBuf::from("tokens")
}

/// Project configuration.
///
/// ```toml
/// tokens_dir = "tokens"
///
/// [load]
/// default_mode = "Light"
///
/// [api]
/// file_id = "AbC123"
///
/// [[modules]]
/// kind = "colors"
/// json_dir = "src/tokens"
/// styles_dir = "src/styles"
/// ```
///
/// Relative paths are resolved against the directory holding the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default = "default_tokens_dir")]
    pub tokens_dir: PathBuf,
    #[serde(default)]
    pub load: LoadOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiSection>,
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// Remote design-file access for `fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    pub file_id: String,
    /// Access token; the `TOKENFORGE_API_TOKEN` environment variable is used
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModuleConfig {
    Colors(Colors),
    Shadows(Shadows),
    Breakpoints(Breakpoints),
    #[serde(rename = "breakpoints_list")]
    BreakpointList(BreakpointList),
    Container(Container),
}

impl ModuleConfig {
    pub fn generator(&self) -> &dyn Generator {
        match self {
            ModuleConfig::Colors(m) => m,
            ModuleConfig::Shadows(m) => m,
            ModuleConfig::Breakpoints(m) => m,
            ModuleConfig::BreakpointList(m) => m,
            ModuleConfig::Container(m) => m,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            tokens_dir: default_tokens_dir(),
            load: LoadOptions::default(),
            api: None,
            modules: Vec::new(),
        }
    }
}

impl ProjectConfig {
    pub fn parse(content: &str) -> Result<Self, GenerateError> {
        toml::from_str(content).map_err(|e| GenerateError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GenerateError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| GenerateError::Config(format!("{}: {e}", path.display())))
    }

    pub fn to_toml(&self) -> Result<String, GenerateError> {
        toml::to_string_pretty(self).map_err(|e| GenerateError::Config(e.to_string()))
    }

    /// `tokens_dir` resolved against `base`.
    pub fn tokens_path(&self, base: &Path) -> PathBuf {
        base.join(&self.tokens_dir)
    }

    pub fn generators(&self) -> impl Iterator<Item = &dyn Generator> {
        self.modules.iter().map(ModuleConfig::generator)
    }
}

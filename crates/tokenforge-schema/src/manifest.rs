use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the manifest inside a token source directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("collection name must not be empty")]
    EmptyCollectionName,
    #[error("mode name in collection '{collection}' must not be empty")]
    EmptyModeName { collection: String },
    #[error("empty file name listed under '{owner}'")]
    EmptyFileName { owner: String },
    #[error("collections '{first}' and '{second}' both normalize to '{normalized}'")]
    CollectionCollision {
        first: String,
        second: String,
        normalized: String,
    },
    #[error(
        "modes '{first}' and '{second}' of collection '{collection}' both normalize to '{normalized}'"
    )]
    ModeCollision {
        collection: String,
        first: String,
        second: String,
        normalized: String,
    },
}

/// Top-level `manifest.json` descriptor.
///
/// Collections, modes, and files merge in declaration order, so both maps keep
/// document order. A repeated key keeps its first position and takes the last
/// value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Manifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub collections: IndexMap<String, CollectionSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StylesSection>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CollectionSection {
    #[serde(default)]
    pub modes: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StylesSection {
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub effect: Vec<String>,
    #[serde(default)]
    pub color: Vec<String>,
    #[serde(default)]
    pub grid: Vec<String>,
}

impl StylesSection {
    pub fn files(&self, category: StyleCategory) -> &[String] {
        match category {
            StyleCategory::Text => &self.text,
            StyleCategory::Effect => &self.effect,
            StyleCategory::Color => &self.color,
            StyleCategory::Grid => &self.grid,
        }
    }
}

/// One of the four fixed, mode-less style groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleCategory {
    Text,
    Effect,
    Color,
    Grid,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 4] = [
        StyleCategory::Text,
        StyleCategory::Effect,
        StyleCategory::Color,
        StyleCategory::Grid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleCategory::Text => "text",
            StyleCategory::Effect => "effect",
            StyleCategory::Color => "color",
            StyleCategory::Grid => "grid",
        }
    }
}

impl fmt::Display for StyleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    Ok(serde_json::from_str(input)?)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}

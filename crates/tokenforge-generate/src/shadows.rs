use crate::css::{css_length, FlatTokens};
use crate::{GenerateError, Generator, OutputFile};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tokenforge_core::TokenManager;
use tokenforge_schema::{StyleCategory, TokenType};
use tracing::{info, warn};

pub const SHADOW_PREFIX: &str = "sh-";

fn default_true() -> bool {
    true
}

fn default_json_file() -> String {
    "shadows.json".to_owned()
}

fn default_css_file() -> String {
    "shadows.css".to_owned()
}

/// `box-shadow` custom properties from effect styles and shadow variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shadows {
    #[serde(default)]
    pub include_variables: Vec<String>,
    #[serde(default = "default_true")]
    pub include_styles: bool,
    pub json_dir: PathBuf,
    pub styles_dir: PathBuf,
    #[serde(default = "default_json_file")]
    pub json_file_name: String,
    #[serde(default = "default_css_file")]
    pub css_file_name: String,
}

impl Shadows {
    pub fn new(json_dir: impl Into<PathBuf>, styles_dir: impl Into<PathBuf>) -> Self {
        Self {
            include_variables: Vec::new(),
            include_styles: true,
            json_dir: json_dir.into(),
            styles_dir: styles_dir.into(),
            json_file_name: default_json_file(),
            css_file_name: default_css_file(),
        }
    }

    pub fn collect(&self, manager: &TokenManager) -> Result<FlatTokens, GenerateError> {
        if self.include_variables.is_empty() && !self.include_styles {
            return Err(GenerateError::InvalidInput(
                "either include_variables or include_styles must be enabled".to_owned(),
            ));
        }

        let mut tokens = FlatTokens::new();
        if self.include_styles {
            if let Some(effects) = manager.style(StyleCategory::Effect)? {
                tokens.extend_from_group(effects, SHADOW_PREFIX, TokenType::Shadow, &render_shadow);
            }
        }
        for name in &self.include_variables {
            match manager.subgroup(name)? {
                Some(group) => {
                    tokens.extend_from_group(group, SHADOW_PREFIX, TokenType::Shadow, &render_shadow);
                }
                None => warn!("shadows: variable group '{name}' not found"),
            }
        }
        Ok(tokens)
    }
}

impl Generator for Shadows {
    fn name(&self) -> &'static str {
        "shadows"
    }

    fn generate(&self, manager: &TokenManager) -> Result<Vec<OutputFile>, GenerateError> {
        let tokens = self.collect(manager)?;
        if tokens.is_empty() {
            warn!("shadows: no shadow tokens generated");
            return Ok(Vec::new());
        }
        info!("shadows: {} tokens", tokens.len());
        Ok(vec![
            OutputFile::new(self.json_dir.join(&self.json_file_name), tokens.to_json()?),
            OutputFile::new(self.styles_dir.join(&self.css_file_name), tokens.to_css()),
        ])
    }
}

/// `box-shadow` text of a resolved shadow value: one layer object or a list
/// of them, joined with `, `. Strings are taken as already rendered.
pub fn render_shadow(value: &Value) -> Option<String> {
    match value {
        Value::Array(layers) if !layers.is_empty() => layers
            .iter()
            .map(render_layer)
            .collect::<Option<Vec<_>>>()
            .map(|l| l.join(", ")),
        Value::Object(_) => render_layer(value),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// `[inset ]offsetX offsetY blur spread color`
fn render_layer(layer: &Value) -> Option<String> {
    let field = |name: &str| layer.get(name).map_or(Some("0".to_owned()), css_length);
    let color = layer.get("color")?.as_str()?;
    let body = format!(
        "{} {} {} {} {color}",
        field("offsetX")?,
        field("offsetY")?,
        field("blur")?,
        field("spread")?
    );
    let inset = layer.get("inset").and_then(Value::as_bool).unwrap_or(false)
        || layer.get("type").and_then(Value::as_str) == Some("innerShadow");
    Some(if inset { format!("inset {body}") } else { body })
}

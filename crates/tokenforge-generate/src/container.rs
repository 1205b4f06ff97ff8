use crate::css::{css_length, format_block, indent};
use crate::{GenerateError, Generator, OutputFile};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tokenforge_core::TokenManager;
use tokenforge_schema::{StyleCategory, TokenGroup, TokenNode};
use tracing::{debug, info, warn};

fn default_width() -> u32 {
    1440
}

fn default_true() -> bool {
    true
}

fn default_file_name() -> String {
    "container".to_owned()
}

/// Responsive `.container` rules from column grid styles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Container {
    /// Max width of centered containers, in px.
    #[serde(default = "default_width")]
    pub container_width: u32,
    /// Cascade layer; `components` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    /// Emit `<file_name>.module.css` instead of `<file_name>.css`.
    #[serde(default = "default_true")]
    pub is_module: bool,
    pub styles_dir: PathBuf,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRule {
    /// Fixed width, auto side margins.
    Center { width: u32 },
    /// Full width with side padding.
    Stretch { margin: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerToken {
    pub breakpoint: u32,
    pub rule: ContainerRule,
}

impl Container {
    pub fn new(styles_dir: impl Into<PathBuf>) -> Self {
        Self {
            container_width: default_width(),
            layer: None,
            is_module: true,
            styles_dir: styles_dir.into(),
            file_name: default_file_name(),
        }
    }

    pub fn output_file_name(&self) -> String {
        if self.is_module {
            format!("{}.module.css", self.file_name)
        } else {
            format!("{}.css", self.file_name)
        }
    }

    /// Container tokens from largest to smallest breakpoint, without
    /// consecutive repeats.
    pub fn extract(
        &self,
        grid: &TokenGroup,
        resolve: &dyn Fn(&Value) -> Option<Value>,
    ) -> Vec<ContainerToken> {
        let mut tokens = Vec::new();
        for (key, node) in grid {
            let Ok(breakpoint) = key.trim().parse::<u32>() else {
                debug!("container: skipping non-numeric grid key '{key}'");
                continue;
            };
            let Some(Value::Array(items)) = node_value(node) else {
                continue;
            };
            for item in items {
                if item.get("pattern").and_then(Value::as_str) != Some("columns") {
                    continue;
                }
                match item.get("alignment").and_then(Value::as_str) {
                    Some("center") => tokens.push(ContainerToken {
                        breakpoint,
                        rule: ContainerRule::Center {
                            width: self.container_width,
                        },
                    }),
                    Some("stretch") => {
                        let margin = item
                            .get("offset")
                            .and_then(resolve)
                            .as_ref()
                            .and_then(css_length);
                        match margin {
                            Some(margin) => tokens.push(ContainerToken {
                                breakpoint,
                                rule: ContainerRule::Stretch { margin },
                            }),
                            None => warn!("container: offset at {key} does not resolve"),
                        }
                    }
                    _ => {}
                }
            }
        }

        tokens.sort_by(|a, b| b.breakpoint.cmp(&a.breakpoint));
        tokens.dedup_by(|current, previous| current.rule == previous.rule);
        tokens
    }

    pub fn render(&self, tokens: &[ContainerToken]) -> String {
        let mut blocks = Vec::new();
        for (index, token) in tokens.iter().enumerate() {
            let previous = index.checked_sub(1).map(|i| &tokens[i].rule);
            let rules = rules_for(&token.rule, previous);
            let block = format_block(".container", &rules);
            if index == 0 {
                blocks.push(block);
            } else {
                blocks.push(format!(
                    "@media (max-width: {}px) {{\n{}\n}}",
                    token.breakpoint.saturating_sub(1),
                    indent(&block, 4)
                ));
            }
        }

        let layer = self.layer.as_deref().unwrap_or("components");
        format!("@layer {layer} {{\n{}\n}}", indent(&blocks.join("\n\n"), 4))
    }
}

fn node_value(node: &TokenNode) -> Option<&Value> {
    match node {
        TokenNode::Token(token) => Some(&token.value),
        TokenNode::Modal(modes) => modes.values().next().map(|t| &t.value),
        TokenNode::Group(_) => None,
    }
}

fn rules_for(rule: &ContainerRule, previous: Option<&ContainerRule>) -> Vec<String> {
    let mut rules = Vec::new();
    match rule {
        ContainerRule::Center { width } => {
            rules.push(format!("max-width: {width}px;"));
            rules.push("margin-left: auto;".to_owned());
            rules.push("margin-right: auto;".to_owned());
            if matches!(previous, Some(ContainerRule::Stretch { .. })) {
                rules.push("padding-left: 0;".to_owned());
                rules.push("padding-right: 0;".to_owned());
            }
        }
        ContainerRule::Stretch { margin } => {
            if matches!(previous, Some(ContainerRule::Center { .. })) {
                rules.push("max-width: none;".to_owned());
                rules.push("margin-left: 0;".to_owned());
                rules.push("margin-right: 0;".to_owned());
            }
            rules.push(format!("padding-left: {margin};"));
            rules.push(format!("padding-right: {margin};"));
        }
    }
    rules
}

impl Generator for Container {
    fn name(&self) -> &'static str {
        "container"
    }

    fn generate(&self, manager: &TokenManager) -> Result<Vec<OutputFile>, GenerateError> {
        let grid = manager
            .style(StyleCategory::Grid)?
            .ok_or(GenerateError::NoGridStyles)?;
        let resolve = |value: &Value| manager.resolve_value(value, None).ok().flatten();
        let tokens = self.extract(grid, &resolve);
        if tokens.is_empty() {
            warn!("container: no container tokens found");
            return Ok(Vec::new());
        }
        info!("container: {} breakpoints", tokens.len());
        Ok(vec![OutputFile::new(
            self.styles_dir.join(self.output_file_name()),
            self.render(&tokens),
        )])
    }
}

//! Shared rendering helpers for the custom-property generators.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tokenforge_schema::{TokenGroup, TokenNode, TokenType};
use tracing::debug;

/// Value of one flattened token: a single value, or one value per mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatValue {
    Single(String),
    Modes(Vec<(String, String)>),
}

impl Serialize for FlatValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FlatValue::Single(value) => serializer.serialize_str(value),
            FlatValue::Modes(modes) => {
                let mut map = serializer.serialize_map(Some(modes.len()))?;
                for (mode, value) in modes {
                    map.serialize_entry(mode, value)?;
                }
                map.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatToken {
    pub name: String,
    pub value: FlatValue,
}

/// Ordered list of flattened tokens. A repeated name keeps its first
/// position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatTokens(Vec<FlatToken>);

impl FlatTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: FlatToken) {
        if let Some(existing) = self.0.iter_mut().find(|t| t.name == token.name) {
            existing.value = token.value;
        } else {
            self.0.push(token);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatToken> {
        self.0.iter()
    }

    /// Flatten every token of `kind` in `group`, naming each
    /// `<prefix><path-joined-by-dash>`. `render` turns one resolved value
    /// into its CSS text; values it rejects are skipped.
    pub fn extend_from_group(
        &mut self,
        group: &TokenGroup,
        prefix: &str,
        kind: TokenType,
        render: &dyn Fn(&Value) -> Option<String>,
    ) {
        self.walk(group, prefix, "", kind, render);
    }

    fn walk(
        &mut self,
        group: &TokenGroup,
        prefix: &str,
        path: &str,
        kind: TokenType,
        render: &dyn Fn(&Value) -> Option<String>,
    ) {
        for (key, node) in group {
            let name = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}-{key}")
            };
            if let TokenNode::Group(children) = node {
                self.walk(children, prefix, &name, kind, render);
                continue;
            }
            if node.token_type() != Some(kind) {
                debug!("skipping {name}: not a {kind} token");
                continue;
            }
            if let Some(value) = flat_value(node, render) {
                self.push(FlatToken {
                    name: format!("{prefix}{name}"),
                    value,
                });
            } else {
                debug!("skipping {name}: value cannot be rendered");
            }
        }
    }

    /// `:root` block for single values, then one class block per mode in
    /// order of first appearance.
    pub fn to_css(&self) -> String {
        let mut root = Vec::new();
        let mut modes: Vec<(String, Vec<String>)> = Vec::new();
        for token in &self.0 {
            let name = custom_property(&token.name);
            match &token.value {
                FlatValue::Single(value) => root.push(format!("{name}: {value};")),
                FlatValue::Modes(values) => {
                    for (mode, value) in values {
                        let line = format!("{name}: {value};");
                        match modes.iter_mut().find(|(m, _)| m == mode) {
                            Some((_, lines)) => lines.push(line),
                            None => modes.push((mode.clone(), vec![line])),
                        }
                    }
                }
            }
        }

        let mut blocks = vec![format_block(":root", &root)];
        blocks.extend(
            modes
                .iter()
                .map(|(mode, lines)| format_block(&mode_class(mode), lines)),
        );
        blocks.retain(|b| !b.is_empty());
        blocks.join("\n\n")
    }

    /// Compact JSON object mapping name to value (or mode to value).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for FlatTokens {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|t| (&t.name, &t.value)))
    }
}

fn flat_value(node: &TokenNode, render: &dyn Fn(&Value) -> Option<String>) -> Option<FlatValue> {
    match node {
        TokenNode::Token(token) => render(&token.value).map(FlatValue::Single),
        TokenNode::Modal(modes) => {
            let rendered: Vec<(String, String)> = modes
                .iter()
                .filter_map(|(mode, token)| render(&token.value).map(|v| (mode.to_string(), v)))
                .collect();
            match rendered.len() {
                0 => None,
                1 => rendered.into_iter().next().map(|(_, v)| FlatValue::Single(v)),
                _ => Some(FlatValue::Modes(rendered)),
            }
        }
        TokenNode::Group(_) => None,
    }
}

/// `selector {` + four-space indented lines + `}`; empty when there are no
/// lines.
pub fn format_block(selector: &str, lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let body = lines
        .iter()
        .map(|l| format!("    {l}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{selector} {{\n{body}\n}}")
}

/// Prefix every non-empty line with `width` spaces.
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{pad}{l}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `.mode-name` for a mode: whitespace runs become `-`, lowercased.
pub fn mode_class(mode: &str) -> String {
    let dashed = mode.split_whitespace().collect::<Vec<_>>().join("-");
    format!(".{}", dashed.to_lowercase())
}

pub fn custom_property(name: &str) -> String {
    format!("--{name}")
}

/// CSS text of a scalar: strings verbatim, zero as `0`, other numbers in px.
pub fn css_length(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if n.as_f64()?.abs() < f64::EPSILON {
                Some("0".to_owned())
            } else {
                Some(format!("{n}px"))
            }
        }
        _ => None,
    }
}

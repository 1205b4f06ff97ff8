use crate::types::ModeName;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Color,
    Dimension,
    Typography,
    Shadow,
    Grid,
    String,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Color => "color",
            TokenType::Dimension => "dimension",
            TokenType::Typography => "typography",
            TokenType::Shadow => "shadow",
            TokenType::Grid => "grid",
            TokenType::String => "string",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "color" => Ok(TokenType::Color),
            "dimension" => Ok(TokenType::Dimension),
            "typography" => Ok(TokenType::Typography),
            "shadow" => Ok(TokenType::Shadow),
            "grid" => Ok(TokenType::Grid),
            "string" => Ok(TokenType::String),
            other => Err(format!("unknown token type '{other}'")),
        }
    }
}

/// A single design value with its declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignToken {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DesignToken {
    pub fn new(token_type: TokenType, value: impl Into<Value>) -> Self {
        Self {
            token_type,
            value: value.into(),
            description: None,
        }
    }
}

/// Keys keep source order: files merge in declaration order and a key first
/// seen in an earlier file keeps its position.
pub type TokenGroup = IndexMap<String, TokenNode>;
/// Modes keep the order they were first contributed in.
pub type ModeMap = IndexMap<ModeName, DesignToken>;

/// A node of the token tree.
///
/// Serializes to the three shapes downstream generators distinguish: a plain
/// mapping (group), a `{type, value}` record (token), or a mapping from mode
/// name to `{type, value}` records (mode-keyed token).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenNode {
    Group(TokenGroup),
    Token(DesignToken),
    Modal(ModeMap),
}

impl TokenNode {
    /// Convert one value of a source token file.
    ///
    /// An object carrying both `$type` and `$value` becomes a token; any other
    /// object becomes a group. Non-object values and tokens with an unknown
    /// `$type` are skipped (`None`).
    pub fn from_source(value: Value) -> Option<Self> {
        let Value::Object(mut object) = value else {
            return None;
        };

        if !(object.contains_key("$type") && object.contains_key("$value")) {
            return Some(TokenNode::Group(group_from_object(object)));
        }

        let declared = object.get("$type").and_then(Value::as_str);
        let token_type = match declared.map(str::parse::<TokenType>) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                debug!("skipping token: {e}");
                return None;
            }
            None => {
                debug!("skipping token with non-string $type");
                return None;
            }
        };
        let value = object.remove("$value").unwrap_or_default();
        let description = match object.remove("$description") {
            Some(Value::String(d)) => Some(d),
            _ => None,
        };

        Some(TokenNode::Token(DesignToken {
            token_type,
            value,
            description,
        }))
    }

    pub fn as_group(&self) -> Option<&TokenGroup> {
        match self {
            TokenNode::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&DesignToken> {
        match self {
            TokenNode::Token(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_modes(&self) -> Option<&ModeMap> {
        match self {
            TokenNode::Modal(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, TokenNode::Group(_))
    }

    /// Declared type of a leaf; `None` for groups. A mode-keyed token takes
    /// the type of its first declared mode.
    pub fn token_type(&self) -> Option<TokenType> {
        match self {
            TokenNode::Group(_) => None,
            TokenNode::Token(t) => Some(t.token_type),
            TokenNode::Modal(m) => m.values().next().map(|t| t.token_type),
        }
    }

    /// View a leaf as one token record.
    ///
    /// A plain token is returned as is. A mode-keyed token becomes
    /// `{type, value: {mode: value, ...}}` with the type of its first mode.
    pub fn merged_modes(&self) -> Option<DesignToken> {
        match self {
            TokenNode::Group(_) => None,
            TokenNode::Token(t) => Some(t.clone()),
            TokenNode::Modal(modes) => {
                let first = modes.values().next()?;
                let value: Map<String, Value> = modes
                    .iter()
                    .map(|(mode, token)| (mode.to_string(), token.value.clone()))
                    .collect();
                Some(DesignToken {
                    token_type: first.token_type,
                    value: Value::Object(value),
                    description: first.description.clone(),
                })
            }
        }
    }
}

fn group_from_object(object: Map<String, Value>) -> TokenGroup {
    object
        .into_iter()
        .filter(|(key, _)| !key.starts_with('$'))
        .filter_map(|(key, child)| TokenNode::from_source(child).map(|node| (key, node)))
        .collect()
}

/// Parse a whole source token file into a group with its original keys.
///
/// A file whose root is not an object contributes an empty group.
pub fn parse_token_group(value: Value) -> TokenGroup {
    match value {
        Value::Object(object) => group_from_object(object),
        _ => TokenGroup::new(),
    }
}

use crate::css::FlatTokens;
use crate::{GenerateError, Generator, OutputFile};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tokenforge_core::TokenManager;
use tokenforge_schema::{StyleCategory, TokenType};
use tracing::{info, warn};

pub const COLOR_PREFIX: &str = "cl-";

fn default_true() -> bool {
    true
}

fn default_json_file() -> String {
    "colors.json".to_owned()
}

fn default_css_file() -> String {
    "colors.css".to_owned()
}

/// Color custom properties from color styles and color variable groups.
///
/// Writes `<json_dir>/<json_file_name>` and `<styles_dir>/<css_file_name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Colors {
    /// Variable groups (collections or subgroups) to include.
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

impl Colors {
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
            if let Some(styles) = manager.style(StyleCategory::Color)? {
                tokens.extend_from_group(styles, COLOR_PREFIX, TokenType::Color, &render_color);
            }
        }
        for name in &self.include_variables {
            match manager.subgroup(name)? {
                Some(group) => {
                    tokens.extend_from_group(group, COLOR_PREFIX, TokenType::Color, &render_color);
                }
                None => warn!("colors: variable group '{name}' not found"),
            }
        }
        Ok(tokens)
    }
}

impl Generator for Colors {
    fn name(&self) -> &'static str {
        "colors"
    }

    fn generate(&self, manager: &TokenManager) -> Result<Vec<OutputFile>, GenerateError> {
        let tokens = self.collect(manager)?;
        if tokens.is_empty() {
            warn!("colors: no color tokens generated");
            return Ok(Vec::new());
        }
        info!("colors: {} tokens", tokens.len());
        Ok(vec![
            OutputFile::new(self.json_dir.join(&self.json_file_name), tokens.to_json()?),
            OutputFile::new(self.styles_dir.join(&self.css_file_name), tokens.to_css()),
        ])
    }
}

/// CSS text of a resolved color value: a color string, or a gradient record
/// `{type, angle, stops: [{color, position}]}`.
pub fn render_color(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(gradient) => {
            let kind = gradient.get("type")?.as_str()?;
            let angle = gradient
                .get("angle")
                .map_or_else(|| "180".to_owned(), format_number);
            let stops = gradient_stops(gradient.get("stops")?)?;
            match kind {
                "linear" | "diamond" => Some(format!("linear-gradient({angle}deg, {stops})")),
                "radial" => Some(format!("radial-gradient(circle, {stops})")),
                "conic" => Some(format!("conic-gradient(from {angle}deg, {stops})")),
                _ => None,
            }
        }
        _ => None,
    }
}

fn format_number(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `color[ N%]` per stop; the percentage is omitted at 0% and 100%.
fn gradient_stops(stops: &Value) -> Option<String> {
    let stops = stops.as_array()?;
    let mut out = Vec::with_capacity(stops.len());
    for stop in stops {
        let color = stop.get("color")?.as_str()?;
        let position = stop.get("position").and_then(Value::as_f64).unwrap_or(0.0);
        let percent = (position * 1000.0).round() / 10.0;
        if percent > 0.0 && percent < 100.0 {
            out.push(format!("{color} {percent}%"));
        } else {
            out.push(color.to_owned());
        }
    }
    Some(out.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_colors_pass_through() {
        assert_eq!(render_color(&json!("#ff0000")).unwrap(), "#ff0000");
        assert!(render_color(&json!(12)).is_none());
    }

    #[test]
    fn linear_gradient_with_inner_stops() {
        let gradient = json!({
            "type": "linear",
            "angle": 90,
            "stops": [
                { "color": "#000", "position": 0 },
                { "color": "#777", "position": 0.3333 },
                { "color": "#fff", "position": 1 }
            ]
        });
        assert_eq!(
            render_color(&gradient).unwrap(),
            "linear-gradient(90deg, #000, #777 33.3%, #fff)"
        );
    }

    #[test]
    fn other_gradient_kinds() {
        let stops = json!([{ "color": "red", "position": 0 }, { "color": "blue", "position": 0.5 }]);
        let radial = json!({ "type": "radial", "angle": 0, "stops": stops });
        assert_eq!(
            render_color(&radial).unwrap(),
            "radial-gradient(circle, red, blue 50%)"
        );
        let conic = json!({ "type": "conic", "angle": 45, "stops": stops });
        assert_eq!(
            render_color(&conic).unwrap(),
            "conic-gradient(from 45deg, red, blue 50%)"
        );
        let diamond = json!({ "type": "diamond", "angle": 45, "stops": stops });
        assert!(render_color(&diamond).unwrap().starts_with("linear-gradient(45deg"));
        let unknown = json!({ "type": "mesh", "stops": stops });
        assert!(render_color(&unknown).is_none());
    }

    #[test]
    fn config_defaults() {
        let colors: Colors =
            serde_json::from_value(json!({ "json_dir": "out", "styles_dir": "css" })).unwrap();
        assert_eq!(colors, Colors::new("out", "css"));
    }
}

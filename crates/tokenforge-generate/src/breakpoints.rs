use crate::css::{custom_property, format_block};
use crate::{GenerateError, Generator, OutputFile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokenforge_core::TokenManager;
use tokenforge_schema::{StyleCategory, TokenGroup};
use tracing::{debug, info, warn};

/// Names assigned from the end: the smallest breakpoint takes the last name.
pub const DEFAULT_BREAKPOINT_NAMES: [&str; 9] =
    ["xxxl", "xxl", "xl", "lg", "md", "sm", "xs", "xxs", "xxxs"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleExtension {
    Css,
    Scss,
}

fn default_extensions() -> Vec<StyleExtension> {
    vec![StyleExtension::Css]
}

fn default_names() -> Vec<String> {
    DEFAULT_BREAKPOINT_NAMES.iter().map(|n| (*n).to_owned()).collect()
}

fn default_json_file() -> String {
    "breakpoints.json".to_owned()
}

fn default_styles_file() -> String {
    "breakpoints".to_owned()
}

/// Named breakpoints from the numeric keys of the grid styles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Breakpoints {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<StyleExtension>,
    #[serde(default = "default_names")]
    pub names: Vec<String>,
    pub json_dir: PathBuf,
    pub styles_dir: PathBuf,
    #[serde(default = "default_json_file")]
    pub json_file_name: String,
    /// Stem of the stylesheet; `.css` / `.scss` is appended per extension.
    #[serde(default = "default_styles_file")]
    pub styles_file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub name: String,
    /// Key as written in the grid styles, e.g. `768`.
    pub key: String,
    pub width: i64,
}

impl Breakpoints {
    pub fn new(json_dir: impl Into<PathBuf>, styles_dir: impl Into<PathBuf>) -> Self {
        Self {
            extensions: default_extensions(),
            names: default_names(),
            json_dir: json_dir.into(),
            styles_dir: styles_dir.into(),
            json_file_name: default_json_file(),
            styles_file_name: default_styles_file(),
        }
    }

    /// Breakpoints in ascending width order.
    pub fn extract(&self, grid: &TokenGroup) -> Result<Vec<Breakpoint>, GenerateError> {
        name_breakpoints(grid, &self.names, true)
    }
}

/// Numeric grid keys sorted by width and named from the end of `names`.
/// With `strict`, a non-numeric key is an error; otherwise it is skipped.
fn name_breakpoints(
    grid: &TokenGroup,
    names: &[String],
    strict: bool,
) -> Result<Vec<Breakpoint>, GenerateError> {
    let mut numeric: Vec<(&str, f64)> = grid
        .keys()
        .filter_map(|k| k.trim().parse::<f64>().ok().map(|w| (k.as_str(), w)))
        .collect();
    numeric.sort_by(|a, b| a.1.total_cmp(&b.1));

    if numeric.len() > names.len() {
        return Err(GenerateError::NotEnoughNames {
            found: numeric.len(),
            available: names.len(),
            names: names.join(", "),
        });
    }

    let invalid: Vec<&str> = grid
        .keys()
        .filter(|k| k.trim().parse::<f64>().is_err())
        .map(String::as_str)
        .collect();
    if !invalid.is_empty() {
        if strict {
            return Err(GenerateError::NonNumericBreakpoints(invalid.join(", ")));
        }
        debug!("skipping non-numeric grid keys: {}", invalid.join(", "));
    }

    let count = names.len();
    Ok(numeric
        .into_iter()
        .enumerate()
        .map(|(index, (key, width))| Breakpoint {
            name: names[count - 1 - index].clone(),
            key: key.trim().to_owned(),
            width: width.trunc() as i64,
        })
        .collect())
}

fn grid_styles(manager: &TokenManager) -> Result<&TokenGroup, GenerateError> {
    manager
        .style(StyleCategory::Grid)?
        .ok_or(GenerateError::NoGridStyles)
}

fn default_list_file() -> String {
    "breakpointList.scss".to_owned()
}

/// The breakpoints as one SCSS map plus the name of the widest one:
///
/// ```scss
/// $breakpointList: (
///     sm: 360,
///     lg: 1440
/// );
/// $defaultBreakpoint: 'lg';
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakpointList {
    #[serde(default = "default_names")]
    pub names: Vec<String>,
    pub styles_dir: PathBuf,
    #[serde(default = "default_list_file")]
    pub file_name: String,
}

impl BreakpointList {
    pub fn new(styles_dir: impl Into<PathBuf>) -> Self {
        Self {
            names: default_names(),
            styles_dir: styles_dir.into(),
            file_name: default_list_file(),
        }
    }

    /// Breakpoints in ascending width order; non-numeric grid keys are ignored.
    pub fn extract(&self, grid: &TokenGroup) -> Result<Vec<Breakpoint>, GenerateError> {
        name_breakpoints(grid, &self.names, false)
    }

    pub fn render(breakpoints: &[Breakpoint]) -> String {
        let entries: Vec<String> = breakpoints
            .iter()
            .map(|b| format!("    {}: {}", b.name, b.width))
            .collect();
        let default = breakpoints
            .last()
            .map_or(DEFAULT_BREAKPOINT_NAMES[0], |b| b.name.as_str());
        format!(
            "$breakpointList: (\n{}\n);\n$defaultBreakpoint: '{default}';",
            entries.join(",\n")
        )
    }
}

impl Generator for BreakpointList {
    fn name(&self) -> &'static str {
        "breakpoints_list"
    }

    fn generate(&self, manager: &TokenManager) -> Result<Vec<OutputFile>, GenerateError> {
        let breakpoints = self.extract(grid_styles(manager)?)?;
        if breakpoints.is_empty() {
            warn!("breakpoints_list: no breakpoints found in grid styles");
            return Ok(Vec::new());
        }
        info!("breakpoints_list: {} entries", breakpoints.len());
        Ok(vec![OutputFile::new(
            self.styles_dir.join(&self.file_name),
            Self::render(&breakpoints),
        )])
    }
}

impl Generator for Breakpoints {
    fn name(&self) -> &'static str {
        "breakpoints"
    }

    fn generate(&self, manager: &TokenManager) -> Result<Vec<OutputFile>, GenerateError> {
        let breakpoints = self.extract(grid_styles(manager)?)?;
        if breakpoints.is_empty() {
            warn!("breakpoints: no breakpoints found in grid styles");
            return Ok(Vec::new());
        }
        info!(
            "breakpoints: {}",
            breakpoints
                .iter()
                .map(|b| b.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let json: serde_json::Map<String, serde_json::Value> = breakpoints
            .iter()
            .map(|b| (b.name.clone(), b.width.into()))
            .collect();
        let mut outputs = vec![OutputFile::new(
            self.json_dir.join(&self.json_file_name),
            serde_json::to_string(&json)?,
        )];

        if self.extensions.contains(&StyleExtension::Css) {
            let lines: Vec<String> = breakpoints
                .iter()
                .map(|b| format!("{}: {}px;", custom_property(&b.name), b.key))
                .collect();
            outputs.push(OutputFile::new(
                self.styles_dir.join(format!("{}.css", self.styles_file_name)),
                format_block(":root", &lines),
            ));
        }
        if self.extensions.contains(&StyleExtension::Scss) {
            let lines: Vec<String> = breakpoints
                .iter()
                .map(|b| format!("${}: {}px;", b.name, b.key))
                .collect();
            outputs.push(OutputFile::new(
                self.styles_dir.join(format!("{}.scss", self.styles_file_name)),
                lines.join("\n"),
            ));
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokenforge_schema::parse_token_group;

    fn grid(keys: &[&str]) -> TokenGroup {
        let mut object = serde_json::Map::new();
        for key in keys {
            object.insert(
                (*key).to_owned(),
                json!({ "$type": "grid", "$value": [] }),
            );
        }
        parse_token_group(serde_json::Value::Object(object))
    }

    #[test]
    fn names_are_taken_from_the_end() {
        let module = Breakpoints::new("json", "css");
        let found = module.extract(&grid(&["1440", "360", "768"])).unwrap();
        let pairs: Vec<(&str, i64)> = found.iter().map(|b| (b.name.as_str(), b.width)).collect();
        assert_eq!(pairs, vec![("xxxs", 360), ("xxs", 768), ("xs", 1440)]);
    }

    #[test]
    fn numeric_not_lexicographic_order() {
        let mut module = Breakpoints::new("json", "css");
        module.names = vec!["lg".into(), "md".into(), "sm".into()];
        let found = module.extract(&grid(&["1024", "640", "80"])).unwrap();
        let names: Vec<&str> = found.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["sm", "md", "lg"]);
        assert_eq!(found[0].width, 80);
    }

    #[test]
    fn too_few_names_is_an_error() {
        let mut module = Breakpoints::new("json", "css");
        module.names = vec!["only".into()];
        let err = module.extract(&grid(&["360", "768"])).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::NotEnoughNames {
                found: 2,
                available: 1,
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_keys_are_an_error() {
        let module = Breakpoints::new("json", "css");
        let err = module.extract(&grid(&["360", "desktop"])).unwrap_err();
        match err {
            GenerateError::NonNumericBreakpoints(keys) => assert_eq!(keys, "desktop"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn list_skips_non_numeric_keys() {
        let module = BreakpointList::new("styles");
        let found = module.extract(&grid(&["768", "desktop", "360"])).unwrap();
        let widths: Vec<i64> = found.iter().map(|b| b.width).collect();
        assert_eq!(widths, vec![360, 768]);
    }

    #[test]
    fn list_renders_scss_map_with_widest_default() {
        let mut module = BreakpointList::new("styles");
        module.names = vec!["lg".into(), "md".into(), "sm".into()];
        let found = module.extract(&grid(&["1440", "360", "768"])).unwrap();
        assert_eq!(
            BreakpointList::render(&found),
            "$breakpointList: (\n    sm: 360,\n    md: 768,\n    lg: 1440\n);\n$defaultBreakpoint: 'lg';"
        );
        assert_eq!(
            BreakpointList::render(&[]),
            "$breakpointList: (\n\n);\n$defaultBreakpoint: 'xxxl';"
        );
    }

    #[test]
    fn list_still_needs_enough_names() {
        let mut module = BreakpointList::new("styles");
        module.names = vec!["only".into()];
        assert!(matches!(
            module.extract(&grid(&["360", "768"])),
            Err(GenerateError::NotEnoughNames { .. })
        ));
    }

    #[test]
    fn extensions_deserialize_lowercase() {
        let module: Breakpoints = serde_json::from_value(json!({
            "json_dir": "j", "styles_dir": "s", "extensions": ["css", "scss"]
        }))
        .unwrap();
        assert_eq!(module.extensions, vec![StyleExtension::Css, StyleExtension::Scss]);
        assert_eq!(module.names.len(), 9);
    }
}

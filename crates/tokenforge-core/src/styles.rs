use crate::loader::LoadedFiles;
use crate::tree::{merge_groups, normalize_group};
use std::collections::BTreeMap;
use tokenforge_schema::{StyleCategory, StyleSource, TokenGroup};

/// Build the unresolved tree of every declared style category.
///
/// Style files carry no mode; each category is a plain recursive merge of its
/// files in declaration order.
pub fn build_styles(
    sources: &[StyleSource],
    files: &LoadedFiles,
) -> BTreeMap<StyleCategory, TokenGroup> {
    sources
        .iter()
        .map(|source| {
            let mut tree = TokenGroup::new();
            for raw in files.in_order(&source.files) {
                merge_groups(&mut tree, normalize_group(raw.clone()));
            }
            (source.category, tree)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokenforge_schema::{parse_manifest_str, parse_token_group};

    #[test]
    fn merges_files_per_category() {
        let manifest = parse_manifest_str(
            r#"{ "collections": {}, "styles": {
                "color": ["a.json", "b.json"],
                "grid": ["grid.json"]
            } }"#,
        )
        .unwrap()
        .normalize()
        .unwrap();
        let files: LoadedFiles = [
            ("a.json", json!({ "Brand": { "primary": { "$type": "color", "$value": "#00f" } } })),
            ("b.json", json!({ "Brand": { "primary": { "$type": "color", "$value": "#0ff" }, "muted": { "$type": "color", "$value": "#999" } } })),
            ("grid.json", json!({ "1440": { "$type": "grid", "$value": [] } })),
        ]
        .into_iter()
        .map(|(name, v)| (name.to_owned(), parse_token_group(v)))
        .collect();

        let styles = build_styles(&manifest.styles, &files);
        assert_eq!(styles.len(), 2);
        let brand = styles[&StyleCategory::Color]["Brand"].as_group().unwrap();
        assert_eq!(brand["primary"].as_token().unwrap().value, json!("#0ff"));
        assert!(brand.contains_key("muted"));
        assert!(styles[&StyleCategory::Grid].contains_key("1440"));
        assert!(!styles.contains_key(&StyleCategory::Text));
    }
}

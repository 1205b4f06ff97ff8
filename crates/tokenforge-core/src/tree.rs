//! Structural operations on token trees: key normalization, mode tagging,
//! merging, lookup, and the post-resolution cleanups.

use indexmap::map::Entry;
use serde_json::{Map, Value};
use tokenforge_schema::{
    keys_match, normalize_key, normalize_references, DesignToken, ModeMap, ModeName, TokenGroup,
    TokenNode, TokenType,
};

/// Normalize every key of a raw group, recursively, and rewrite the reference
/// paths inside token values to the normalized spelling.
///
/// Keys that collide after normalization are merged in source key order.
pub fn normalize_group(raw: TokenGroup) -> TokenGroup {
    let mut out = TokenGroup::new();
    for (key, node) in raw {
        let node = match node {
            TokenNode::Group(g) => TokenNode::Group(normalize_group(g)),
            TokenNode::Token(t) => TokenNode::Token(normalize_token(t)),
            TokenNode::Modal(modes) => TokenNode::Modal(
                modes
                    .into_iter()
                    .map(|(mode, t)| (mode, normalize_token(t)))
                    .collect(),
            ),
        };
        insert_merged(&mut out, normalize_key(&key), node);
    }
    out
}

fn normalize_token(mut token: DesignToken) -> DesignToken {
    let rename_properties = token.token_type == TokenType::Typography;
    token.value = normalize_value(token.value, rename_properties);
    token
}

/// Typography records also get their property names normalized
/// (`"font family"` becomes `"fontFamily"`).
fn normalize_value(value: Value, rename_properties: bool) -> Value {
    match value {
        Value::String(s) => Value::String(normalize_references(&s)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| normalize_value(v, rename_properties))
                .collect(),
        ),
        Value::Object(object) => {
            let mut out = Map::with_capacity(object.len());
            for (key, v) in object {
                let key = if rename_properties {
                    normalize_key(&key)
                } else {
                    key
                };
                out.insert(key, normalize_value(v, rename_properties));
            }
            Value::Object(out)
        }
        other => other,
    }
}

/// Wrap every plain token leaf in a single-entry mode map.
pub fn tag_mode(group: TokenGroup, mode: &ModeName) -> TokenGroup {
    group
        .into_iter()
        .map(|(key, node)| {
            let node = match node {
                TokenNode::Group(g) => TokenNode::Group(tag_mode(g, mode)),
                TokenNode::Token(t) => {
                    let mut modes = ModeMap::new();
                    modes.insert(mode.clone(), t);
                    TokenNode::Modal(modes)
                }
                modal @ TokenNode::Modal(_) => modal,
            };
            (key, node)
        })
        .collect()
}

/// Merge `source` into `target`.
///
/// Groups merge recursively, mode maps merge key-wise with the source winning
/// per mode, and anything else is replaced by the source.
pub fn merge_groups(target: &mut TokenGroup, source: TokenGroup) {
    for (key, node) in source {
        insert_merged(target, key, node);
    }
}

fn insert_merged(target: &mut TokenGroup, key: String, node: TokenNode) {
    match target.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(node);
        }
        Entry::Occupied(mut slot) => merge_node(slot.get_mut(), node),
    }
}

pub fn merge_node(target: &mut TokenNode, source: TokenNode) {
    match (target, source) {
        (TokenNode::Group(t), TokenNode::Group(s)) => merge_groups(t, s),
        (TokenNode::Modal(t), TokenNode::Modal(s)) => t.extend(s),
        (slot, other) => *slot = other,
    }
}

/// Replace every single-entry mode map with its only token.
pub fn collapse_single_modes(group: TokenGroup) -> TokenGroup {
    group
        .into_iter()
        .map(|(key, node)| {
            let node = match node {
                TokenNode::Group(g) => TokenNode::Group(collapse_single_modes(g)),
                TokenNode::Modal(modes) if modes.len() == 1 => match modes.into_values().next() {
                    Some(token) => TokenNode::Token(token),
                    None => TokenNode::Modal(ModeMap::new()),
                },
                other => other,
            };
            (key, node)
        })
        .collect()
}

/// Drop groups left without any token, recursively.
pub fn prune_empty(group: &mut TokenGroup) {
    group.retain(|_, node| match node {
        TokenNode::Group(g) => {
            prune_empty(g);
            !g.is_empty()
        }
        TokenNode::Modal(modes) => !modes.is_empty(),
        TokenNode::Token(_) => true,
    });
}

fn child<'a>(group: &'a TokenGroup, segment: &str) -> Option<(&'a str, &'a TokenNode)> {
    if let Some((key, node)) = group.get_key_value(segment) {
        return Some((key.as_str(), node));
    }
    group
        .iter()
        .find(|(key, _)| keys_match(key, segment))
        .map(|(key, node)| (key.as_str(), node))
}

/// Follow a dotted path from `group`. Returns the node and the path spelled
/// with the tree's actual keys.
pub fn lookup_exact<'a>(group: &'a TokenGroup, path: &str) -> Option<(String, &'a TokenNode)> {
    let mut segments = path.split('.').map(str::trim);
    let first = segments.next().filter(|s| !s.is_empty())?;
    let (key, mut node) = child(group, first)?;
    let mut found = key.to_owned();

    for segment in segments {
        let TokenNode::Group(inner) = node else {
            return None;
        };
        let (key, next) = child(inner, segment)?;
        found.push('.');
        found.push_str(key);
        node = next;
    }
    Some((found, node))
}

/// Two-phase lookup: the exact path from the root, then the same path under
/// each top-level group in declaration order.
///
/// The fallback scan is linear in the number of top-level groups.
pub fn lookup<'a>(tree: &'a TokenGroup, path: &str) -> Option<(String, &'a TokenNode)> {
    if let Some(hit) = lookup_exact(tree, path) {
        return Some(hit);
    }
    tree.iter().find_map(|(key, node)| {
        let TokenNode::Group(inner) = node else {
            return None;
        };
        lookup_exact(inner, path).map(|(found, node)| (format!("{key}.{found}"), node))
    })
}

/// Number of token leaves in a tree (a mode-keyed leaf counts once).
pub fn count_tokens(group: &TokenGroup) -> usize {
    group
        .values()
        .map(|node| match node {
            TokenNode::Group(g) => count_tokens(g),
            _ => 1,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use tokenforge_schema::parse_token_group;

    fn color(v: &str) -> TokenNode {
        TokenNode::Token(DesignToken::new(TokenType::Color, v))
    }

    fn group(entries: Vec<(&str, TokenNode)>) -> TokenGroup {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect()
    }

    #[test]
    fn normalizes_keys_and_references() {
        let raw = parse_token_group(json!({
            "Font Size": {
                "body-text": { "$type": "string", "$value": "{Font Size.base}" }
            },
            "Text_sizes": {
                "small": { "$type": "dimension", "$value": "12px" }
            }
        }));
        let normalized = normalize_group(raw);
        let font_size = normalized["fontSize"].as_group().unwrap();
        let body = font_size["bodyText"].as_token().unwrap();
        assert_eq!(body.value, json!("{fontSize.base}"));
        // "Text_sizes" maps to "fontSize" too and merges in
        assert!(font_size.contains_key("small"));
    }

    #[test]
    fn typography_properties_are_renamed() {
        let raw = parse_token_group(json!({
            "heading": { "$type": "typography", "$value": {
                "font family": "{Font Family.display}",
                "fontWeight": 700
            } }
        }));
        let normalized = normalize_group(raw);
        let value = &normalized["heading"].as_token().unwrap().value;
        assert_eq!(
            value,
            &json!({ "fontFamily": "{fontFamily.display}", "fontWeight": 700 })
        );
    }

    #[test]
    fn shadow_layer_keys_are_left_alone() {
        let raw = parse_token_group(json!({
            "card": { "$type": "shadow", "$value": [{ "offset_x": "0", "color": "{Shadow Color}" }] }
        }));
        let normalized = normalize_group(raw);
        let value = &normalized["card"].as_token().unwrap().value;
        assert_eq!(value, &json!([{ "offset_x": "0", "color": "{shadowColor}" }]));
    }

    #[test]
    fn tags_every_leaf_with_mode() {
        let tagged = tag_mode(
            group(vec![
                ("primary", color("#fff")),
                ("nested", TokenNode::Group(group(vec![("x", color("#000"))]))),
            ]),
            &ModeName::new("light"),
        );
        assert!(tagged["primary"].as_modes().unwrap().contains_key("light"));
        let nested = tagged["nested"].as_group().unwrap();
        assert!(nested["x"].as_modes().unwrap().contains_key("light"));
    }

    #[test]
    fn merge_unions_groups_and_mode_maps() {
        let light = ModeName::new("light");
        let dark = ModeName::new("dark");
        let mut target = tag_mode(group(vec![("primary", color("#fff"))]), &light);
        merge_groups(
            &mut target,
            tag_mode(
                group(vec![("primary", color("#000")), ("accent", color("#f00"))]),
                &dark,
            ),
        );

        let primary = target["primary"].as_modes().unwrap();
        assert_eq!(primary.len(), 2);
        assert_eq!(primary["dark"].value, json!("#000"));
        assert!(target.contains_key("accent"));
    }

    #[test]
    fn merge_keeps_first_seen_positions() {
        let light = ModeName::new("light");
        let dark = ModeName::new("dark");
        let mut target = tag_mode(
            group(vec![("zeta", color("#1")), ("alpha", color("#2"))]),
            &light,
        );
        merge_groups(
            &mut target,
            tag_mode(
                group(vec![("beta", color("#3")), ("zeta", color("#4"))]),
                &dark,
            ),
        );

        let keys: Vec<&str> = target.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "beta"]);
        let modes: Vec<&str> = target["zeta"]
            .as_modes()
            .unwrap()
            .keys()
            .map(ModeName::as_str)
            .collect();
        assert_eq!(modes, vec!["light", "dark"]);
    }

    #[test]
    fn last_writer_wins_for_plain_tokens() {
        let mut target = group(vec![("a", color("#111"))]);
        merge_groups(&mut target, group(vec![("a", color("#222"))]));
        assert_eq!(target["a"].as_token().unwrap().value, json!("#222"));

        // shape change: token replaced by group
        merge_groups(
            &mut target,
            group(vec![("a", TokenNode::Group(group(vec![("b", color("#333"))])))]),
        );
        assert!(target["a"].is_group());
    }

    #[test]
    fn collapse_only_touches_single_modes() {
        let light = ModeName::new("light");
        let mut tree = tag_mode(group(vec![("solo", color("#fff"))]), &light);
        merge_groups(
            &mut tree,
            tag_mode(
                group(vec![("both", color("#fff"))]),
                &ModeName::new("dark"),
            ),
        );
        merge_groups(&mut tree, tag_mode(group(vec![("both", color("#000"))]), &light));

        let collapsed = collapse_single_modes(tree);
        assert!(collapsed["solo"].as_token().is_some());
        assert_eq!(collapsed["both"].as_modes().unwrap().len(), 2);
    }

    #[test]
    fn prune_removes_empty_groups() {
        let mut tree = group(vec![
            ("empty", TokenNode::Group(TokenGroup::new())),
            (
                "outer",
                TokenNode::Group(group(vec![("inner", TokenNode::Group(TokenGroup::new()))])),
            ),
            ("kept", color("#fff")),
        ]);
        prune_empty(&mut tree);
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["kept"]);
    }

    #[test]
    fn lookup_exact_then_subgroups() {
        let tree = group(vec![
            (
                "colors",
                TokenNode::Group(group(vec![("primary", color("#fff"))])),
            ),
            (
                "typography",
                TokenNode::Group(group(vec![(
                    "fontSize",
                    TokenNode::Group(group(vec![("body", color("14px"))])),
                )])),
            ),
        ]);

        let (path, _) = lookup(&tree, "colors.primary").unwrap();
        assert_eq!(path, "colors.primary");
        let (path, _) = lookup(&tree, "Colors.primary").unwrap();
        assert_eq!(path, "colors.primary");
        let (path, node) = lookup(&tree, "fontSize.body").unwrap();
        assert_eq!(path, "typography.fontSize.body");
        assert_eq!(node.as_token().unwrap().value, json!("14px"));

        assert!(lookup(&tree, "colors.missing").is_none());
        assert!(lookup(&tree, "colors.primary.deeper").is_none());
        assert!(lookup(&tree, "").is_none());
    }

    #[test]
    fn counts_leaves() {
        let tree = group(vec![
            ("a", color("#fff")),
            ("g", TokenNode::Group(group(vec![("b", color("#000"))]))),
        ]);
        assert_eq!(count_tokens(&tree), 2);
    }

    fn flat_group(keys: &[String], prefix: &str) -> TokenGroup {
        keys.iter()
            .map(|k| (format!("{prefix}{k}"), color(k)))
            .collect()
    }

    proptest! {
        #[test]
        fn disjoint_merge_is_order_independent(
            left in proptest::collection::vec("[a-z]{1,6}", 0..8),
            right in proptest::collection::vec("[a-z]{1,6}", 0..8),
        ) {
            let a = flat_group(&left, "l_");
            let b = flat_group(&right, "r_");

            let mut ab = a.clone();
            merge_groups(&mut ab, b.clone());
            let mut ba = b.clone();
            merge_groups(&mut ba, a.clone());

            prop_assert_eq!(&ab, &ba);
            prop_assert_eq!(ab.len(), a.len() + b.len());
        }
    }
}

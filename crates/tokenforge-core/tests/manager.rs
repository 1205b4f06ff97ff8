use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tokenforge_core::{CoreError, LoadOptions, LoadState, TokenManager};
use tokenforge_schema::{StyleCategory, TokenType};

fn write_json(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn color(value: &str) -> Value {
    json!({ "$type": "color", "$value": value })
}

fn dimension(value: &str) -> Value {
    json!({ "$type": "dimension", "$value": value })
}

async fn loaded(dir: &Path) -> TokenManager {
    let mut manager = TokenManager::new(dir);
    manager.load().await.unwrap();
    manager
}

fn themed_fixture(dir: &Path) {
    write_json(
        dir,
        "manifest.json",
        &json!({
            "name": "themed",
            "collections": {
                "Colors": { "modes": { "Light": ["light.json"], "Dark": ["dark.json"] } }
            }
        }),
    );
    write_json(dir, "light.json", &json!({ "primary": color("#fff") }));
    write_json(dir, "dark.json", &json!({ "primary": color("#000") }));
}

#[tokio::test]
async fn mode_values_fold_into_one_token() {
    let dir = tempfile::tempdir().unwrap();
    themed_fixture(dir.path());
    let manager = loaded(dir.path()).await;

    let token = manager.token("colors.primary").unwrap().unwrap();
    assert_eq!(token.token_type, TokenType::Color);
    assert_eq!(token.value, json!({ "light": "#fff", "dark": "#000" }));

    let variables = serde_json::to_value(manager.variables().unwrap()).unwrap();
    assert_eq!(
        variables,
        json!({ "colors": { "primary": {
            "dark": { "type": "color", "value": "#000" },
            "light": { "type": "color", "value": "#fff" }
        } } })
    );
}

#[tokio::test]
async fn references_use_normalized_paths() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        &json!({
            "name": "refs",
            "collections": {
                "Typography": { "modes": { "Mode 1": ["typography.json"] } },
                "Aliases": { "modes": { "Mode 1": ["aliases.json"] } }
            }
        }),
    );
    write_json(
        dir.path(),
        "typography.json",
        &json!({ "Font Size": { "body": dimension("14px") } }),
    );
    write_json(
        dir.path(),
        "aliases.json",
        &json!({ "bodySize": { "$type": "string", "$value": "{Font Size.body}" } }),
    );
    let manager = loaded(dir.path()).await;

    let alias = manager.token("aliases.bodySize").unwrap().unwrap();
    assert_eq!(alias.value, json!("14px"));
    // single-mode collections are collapsed by default
    assert!(manager.node("typography.fontSize.body").unwrap().unwrap().as_token().is_some());
}

#[tokio::test]
async fn dangling_style_reference_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        &json!({
            "name": "styles",
            "collections": { "Colors": { "modes": { "Mode 1": ["colors.json"] } } },
            "styles": { "color": ["color.styles.json"] }
        }),
    );
    write_json(dir.path(), "colors.json", &json!({ "brand": color("#00f") }));
    write_json(
        dir.path(),
        "color.styles.json",
        &json!({
            "Brand": color("{colors.brand}"),
            "Ghost": color("{colors.doesNotExist}")
        }),
    );
    let manager = loaded(dir.path()).await;

    let colors = manager.style(StyleCategory::Color).unwrap().unwrap();
    assert_eq!(colors["Brand"].as_token().unwrap().value, json!("#00f"));
    assert!(!colors.contains_key("Ghost"));
}

#[tokio::test]
async fn missing_mode_file_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        &json!({
            "name": "partial",
            "collections": {
                "Spacing": { "modes": { "Mode 1": ["present.json", "absent.json"] } }
            }
        }),
    );
    write_json(dir.path(), "present.json", &json!({ "md": dimension("8px") }));
    let manager = loaded(dir.path()).await;

    assert!(manager.is_loaded());
    let md = manager.variable("Spacing", "md").unwrap().unwrap();
    assert_eq!(md.as_token().unwrap().value, json!("8px"));
}

#[tokio::test]
async fn unparsable_mode_file_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    themed_fixture(dir.path());
    fs::write(dir.path().join("dark.json"), "{ truncated").unwrap();
    let manager = loaded(dir.path()).await;

    let token = manager.token("colors.primary").unwrap().unwrap();
    // only the light file contributed, so the single mode was collapsed
    assert_eq!(token.value, json!("#fff"));
}

#[tokio::test]
async fn later_files_win_regardless_of_io_order() {
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<String> = (0..24).map(|i| format!("part-{i:02}.json")).collect();
    for (i, name) in files.iter().enumerate() {
        // earlier files are larger so they tend to finish reading last
        let mut body = serde_json::Map::new();
        body.insert("winner".to_owned(), dimension(&format!("{i}px")));
        for pad in 0..(24 - i) * 50 {
            body.insert(format!("pad{pad}"), dimension("0px"));
        }
        write_json(dir.path(), name, &Value::Object(body));
    }
    write_json(
        dir.path(),
        "manifest.json",
        &json!({ "name": "order", "collections": { "Spacing": { "modes": { "Mode 1": files } } } }),
    );

    for _ in 0..3 {
        let manager = loaded(dir.path()).await;
        let winner = manager.token("spacing.winner").unwrap().unwrap();
        assert_eq!(winner.value, json!("23px"));
    }
}

#[tokio::test]
async fn modes_stay_isolated_through_references() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        &json!({
            "name": "iso",
            "collections": {
                "Primitives": { "modes": { "Mode 1": ["primitives.json"] } },
                "Theme": { "modes": { "Light": ["light.json"], "Dark": ["dark.json"] } }
            }
        }),
    );
    write_json(
        dir.path(),
        "primitives.json",
        &json!({ "white": color("#fff"), "black": color("#000") }),
    );
    write_json(
        dir.path(),
        "light.json",
        &json!({ "bg": color("{primitives.white}"), "fg": color("{theme.bg}") }),
    );
    write_json(
        dir.path(),
        "dark.json",
        &json!({ "bg": color("{primitives.black}"), "fg": color("{theme.bg}") }),
    );
    let manager = loaded(dir.path()).await;

    let fg = manager.token("theme.fg").unwrap().unwrap();
    assert_eq!(fg.value, json!({ "light": "#fff", "dark": "#000" }));

    let in_dark = manager.resolve_value(&json!("{theme.fg}"), Some("Dark")).unwrap();
    assert_eq!(in_dark, Some(json!("#000")));
    // no mode and a two-mode target that lacks the default mode
    assert_eq!(manager.resolve_value(&json!("{theme.fg}"), None).unwrap(), None);
}

#[tokio::test]
async fn sibling_mode_never_fills_a_missing_mode() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        &json!({
            "name": "sibling",
            "collections": {
                "Theme": { "modes": { "Light": ["light.json"], "Dark": ["dark.json"] } }
            }
        }),
    );
    write_json(
        dir.path(),
        "light.json",
        &json!({ "base": color("#fff"), "alias": color("#eee") }),
    );
    write_json(dir.path(), "dark.json", &json!({ "alias": color("{theme.base}") }));
    let manager = loaded(dir.path()).await;

    // dark has no base of its own, so alias keeps only its light value and
    // collapses to it
    let alias = manager.token("theme.alias").unwrap().unwrap();
    assert_eq!(alias.value, json!("#eee"));

    // base collapsed to a plain token, but a dark lookup still misses
    let in_dark = manager.resolve_value(&json!("{theme.base}"), Some("Dark")).unwrap();
    assert_eq!(in_dark, None);
    let in_light = manager.resolve_value(&json!("{theme.base}"), Some("Light")).unwrap();
    assert_eq!(in_light, Some(json!("#fff")));
}

#[tokio::test]
async fn output_follows_declaration_order() {
    let dir = tempfile::tempdir().unwrap();
    themed_fixture(dir.path());
    write_json(
        dir.path(),
        "light.json",
        &json!({ "primary": color("#fff"), "accent": color("#f06") }),
    );
    let manager = loaded(dir.path()).await;

    let primary = manager.token("colors.primary").unwrap().unwrap();
    assert_eq!(
        serde_json::to_string(&primary.value).unwrap(),
        r##"{"light":"#fff","dark":"#000"}"##
    );
    let keys: Vec<&str> = manager
        .subgroup("colors")
        .unwrap()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["primary", "accent"]);
}

#[tokio::test]
async fn cycles_are_dropped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        &json!({ "name": "cycle", "collections": { "Loop": { "modes": { "Mode 1": ["loop.json"] } } } }),
    );
    write_json(
        dir.path(),
        "loop.json",
        &json!({
            "a": dimension("{loop.b}"),
            "b": dimension("{loop.a}"),
            "c": dimension("4px")
        }),
    );
    let manager = loaded(dir.path()).await;
    let group = manager.subgroup("loop").unwrap().unwrap();
    assert_eq!(group.keys().collect::<Vec<_>>(), vec!["c"]);
}

#[tokio::test]
async fn collapse_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        &json!({ "name": "c", "collections": { "Spacing": { "modes": { "Mode 1": ["s.json"] } } } }),
    );
    write_json(dir.path(), "s.json", &json!({ "md": dimension("8px") }));

    let mut manager = TokenManager::with_options(
        dir.path(),
        LoadOptions {
            collapse_single_mode: false,
            ..LoadOptions::default()
        },
    );
    manager.load().await.unwrap();
    let md = manager.node("spacing.md").unwrap().unwrap();
    assert!(md.as_modes().unwrap().contains_key("mode1"));

    let token = manager.token("spacing.md").unwrap().unwrap();
    assert_eq!(token.value, json!({ "mode1": "8px" }));
}

#[tokio::test]
async fn styles_read_default_mode_of_themed_variables() {
    let dir = tempfile::tempdir().unwrap();
    themed_fixture(dir.path());
    let mut manifest: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("manifest.json")).unwrap())
            .unwrap();
    manifest["styles"] = json!({ "color": ["color.json"] });
    write_json(dir.path(), "manifest.json", &manifest);
    write_json(dir.path(), "color.json", &json!({ "surface": color("{colors.primary}") }));

    let mut manager = TokenManager::with_options(
        dir.path(),
        LoadOptions {
            default_mode: Some("Dark".to_owned()),
            ..LoadOptions::default()
        },
    );
    manager.load().await.unwrap();
    let surface = &manager.style(StyleCategory::Color).unwrap().unwrap()["surface"];
    assert_eq!(surface.as_token().unwrap().value, json!("#000"));
}

#[tokio::test]
async fn load_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    themed_fixture(dir.path());
    let mut manager = TokenManager::new(dir.path());
    manager.load().await.unwrap();
    let before = manager.variables().unwrap().clone();

    // changes on disk are not picked up by a second load
    write_json(dir.path(), "light.json", &json!({ "primary": color("#eee") }));
    manager.load().await.unwrap();
    assert_eq!(manager.state(), LoadState::Loaded);
    assert_eq!(manager.variables().unwrap(), &before);
}

#[tokio::test]
async fn bad_manifest_keeps_manager_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("manifest.json"), "not json").unwrap();
    let mut manager = TokenManager::new(dir.path());

    let err = manager.load().await.unwrap_err();
    assert!(matches!(err, CoreError::Manifest { .. }));
    assert!(err.to_string().contains("manifest.json"));
    assert_eq!(manager.state(), LoadState::Unloaded);
    assert!(matches!(manager.variables(), Err(CoreError::NotLoaded)));
}

#[tokio::test]
async fn typography_records_resolve_field_by_field() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        &json!({
            "name": "type",
            "collections": { "Typography": { "modes": { "Mode 1": ["typography.json"] } } },
            "styles": { "text": ["text.json"] }
        }),
    );
    write_json(
        dir.path(),
        "typography.json",
        &json!({
            "Font Family": { "display": { "$type": "string", "$value": "Inter" } },
            "Text_sizes": { "xl": dimension("32px") }
        }),
    );
    write_json(
        dir.path(),
        "text.json",
        &json!({
            "Heading XL": { "$type": "typography", "$value": {
                "font family": "{Font Family.display}",
                "fontSize": "{fontSize.xl}",
                "fontWeight": 700
            } }
        }),
    );
    let manager = loaded(dir.path()).await;

    let text = manager.style(StyleCategory::Text).unwrap().unwrap();
    let heading = text["headingXL"].as_token().unwrap();
    assert_eq!(
        heading.value,
        json!({ "fontFamily": "Inter", "fontSize": "32px", "fontWeight": 700 })
    );
}

//! Canonical key spelling for group names, token names, and reference paths.

/// Source group names whose canonical spelling is not derivable from the
/// generic camelCase rule. Checked before the generic path.
const GROUP_NAME_OVERRIDES: &[(&str, &str)] = &[
    ("Text_sizes", "fontSize"),
    ("Text sizes", "fontSize"),
    ("Line_heights", "lineHeights"),
    ("Line heights", "lineHeights"),
];

fn is_separator(c: char) -> bool {
    c == '-' || c == '_' || c.is_whitespace()
}

/// Normalize a source key into its canonical camelCase form.
///
/// Keys without any separator (space, hyphen, underscore) are returned as-is
/// after trimming, so existing camelCase and PascalCase survive. Otherwise the
/// key is split on separator runs, the first word is lowercased, and every later
/// word gets an uppercase first character with the rest left untouched.
///
/// `normalize_key(normalize_key(k)) == normalize_key(k)` for every `k`.
pub fn normalize_key(key: &str) -> String {
    let trimmed = key.trim();

    if let Some((_, canonical)) = GROUP_NAME_OVERRIDES
        .iter()
        .find(|(source, _)| *source == trimmed)
    {
        return (*canonical).to_owned();
    }

    if !trimmed.contains(is_separator) {
        return trimmed.to_owned();
    }

    let mut out = String::with_capacity(trimmed.len());
    for (index, word) in trimmed
        .split(is_separator)
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        if index == 0 {
            out.push_str(&word.to_lowercase());
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Normalize a collection or mode name into an identifier.
///
/// Same as [`normalize_key`], with the first character lowercased as well:
/// `"Colors"` becomes `"colors"` and `"Mode 1"` becomes `"mode1"`.
pub fn to_identifier(name: &str) -> String {
    lower_first(&normalize_key(name))
}

pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether a tree key answers to a path segment.
///
/// Exact match, or a match once both sides have their first character
/// lowercased. This lets `Colors.primary` address the `colors` collection.
pub fn keys_match(key: &str, segment: &str) -> bool {
    key == segment || lower_first(key) == lower_first(segment)
}

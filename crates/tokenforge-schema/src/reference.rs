//! `{path.to.token}` reference syntax.

use crate::key::normalize_key;

/// A piece of a token string: literal text or the inner path of a `{...}` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Reference(&'a str),
}

fn is_brace(c: char) -> bool {
    c == '{' || c == '}'
}

/// Return the inner path if `value`, once trimmed, is exactly one reference.
///
/// `"{colors.primary}"` yields `Some("colors.primary")`; `"1px {a}"`, `"{}"`
/// and `"{a}{b}"` yield `None`.
pub fn as_reference(value: &str) -> Option<&str> {
    let inner = value.trim().strip_prefix('{')?.strip_suffix('}')?;
    if inner.trim().is_empty() || inner.contains(is_brace) {
        return None;
    }
    Some(inner)
}

pub fn contains_reference(value: &str) -> bool {
    segments(value)
        .iter()
        .any(|s| matches!(s, Segment::Reference(_)))
}

/// Split text into literal and reference segments.
///
/// A reference is a `{` followed by at least one character and the next `}`,
/// with no other brace in between. An unmatched or empty brace pair stays literal.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut literal_start = 0;
    let mut search = 0;

    while let Some(open_rel) = text[search..].find('{') {
        let open = search + open_rel;
        let Some(close_rel) = text[open + 1..].find(is_brace) else {
            break;
        };
        let close = open + 1 + close_rel;

        if text[close..].starts_with('{') {
            // a later brace opens the innermost candidate
            search = close;
            continue;
        }
        if close == open + 1 {
            search = close + 1;
            continue;
        }

        if literal_start < open {
            out.push(Segment::Literal(&text[literal_start..open]));
        }
        out.push(Segment::Reference(&text[open + 1..close]));
        literal_start = close + 1;
        search = literal_start;
    }

    if literal_start < text.len() {
        out.push(Segment::Literal(&text[literal_start..]));
    }
    out
}

/// Run the inner text of every reference through [`normalize_key`].
///
/// `"{font size}"` becomes `"{fontSize}"`, so references line up with the
/// normalized tree before resolution. Literal text is left untouched.
pub fn normalize_references(text: &str) -> String {
    let parts = segments(text);
    if !parts.iter().any(|s| matches!(s, Segment::Reference(_))) {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    for part in parts {
        match part {
            Segment::Literal(literal) => out.push_str(literal),
            Segment::Reference(path) => {
                out.push('{');
                out.push_str(&normalize_key(path));
                out.push('}');
            }
        }
    }
    out
}

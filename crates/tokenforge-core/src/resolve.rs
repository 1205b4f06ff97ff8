use crate::tree::{lookup, prune_empty};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokenforge_schema::{
    as_reference, segments, DesignToken, ModeMap, ModeName, Segment, TokenGroup, TokenNode,
};
use tracing::{debug, warn};

/// Resolves `{path}` references against a variable tree.
///
/// Resolution is recursive and carries the mode of the token being resolved.
/// A reference that cannot be resolved (missing path, group target, cycle,
/// no value for the mode) makes the enclosing value resolve to `None`; tree
/// walks drop such leaves instead of keeping a placeholder.
pub struct Resolver<'a> {
    tree: &'a TokenGroup,
    default_mode: Option<ModeName>,
    declared_modes: HashMap<String, Vec<ModeName>>,
}

/// Where a value is being resolved from: the mode it asks for and the
/// collection the resolution started in.
#[derive(Clone, Copy)]
struct Context<'c> {
    mode: Option<&'c ModeName>,
    collection: Option<&'c str>,
}

impl<'a> Resolver<'a> {
    /// Build a resolver over `tree`. Each collection's declared modes are taken
    /// from the mode keys found under it until [`Self::with_declared_modes`]
    /// supplies them.
    pub fn new(tree: &'a TokenGroup) -> Self {
        let declared_modes = tree
            .iter()
            .filter_map(|(key, node)| {
                let TokenNode::Group(group) = node else {
                    return None;
                };
                let mut modes = Vec::new();
                collect_modes(group, &mut modes);
                Some((key.clone(), modes))
            })
            .collect();
        Self {
            tree,
            default_mode: None,
            declared_modes,
        }
    }

    /// Mode to read from mode-keyed targets when the value being resolved has
    /// no mode of its own (style tokens, ad-hoc values).
    #[must_use]
    pub fn with_default_mode(mut self, mode: Option<ModeName>) -> Self {
        self.default_mode = mode;
        self
    }

    /// Replace the mode list of the given collections, usually with the modes
    /// the manifest declares.
    #[must_use]
    pub fn with_declared_modes(
        mut self,
        collections: impl IntoIterator<Item = (String, Vec<ModeName>)>,
    ) -> Self {
        self.declared_modes.extend(collections);
        self
    }

    /// Resolve the variable tree this resolver was built over.
    ///
    /// Each leaf's own path seeds cycle detection, so `a -> b -> a` is caught
    /// when either leaf is resolved.
    pub fn resolve_variables(&self) -> TokenGroup {
        self.walk(self.tree, Some(""))
    }

    /// Resolve a tree that is not part of the variable tree, such as a style
    /// category.
    pub fn resolve_group(&self, group: &TokenGroup) -> TokenGroup {
        self.walk(group, None)
    }

    pub fn resolve_value(&self, value: &Value, mode: Option<&ModeName>) -> Option<Value> {
        let ctx = Context {
            mode,
            collection: None,
        };
        self.value(value, ctx, &mut Vec::new())
    }

    fn walk(&self, group: &TokenGroup, prefix: Option<&str>) -> TokenGroup {
        let mut out = TokenGroup::new();
        for (key, node) in group {
            let own_path = prefix.map(|p| {
                if p.is_empty() {
                    key.clone()
                } else {
                    format!("{p}.{key}")
                }
            });
            let display_path = own_path.as_deref().unwrap_or(key);
            let collection = own_path.as_deref().and_then(|p| p.split('.').next());

            let resolved = match node {
                TokenNode::Group(inner) => {
                    Some(TokenNode::Group(self.walk(inner, own_path.as_deref())))
                }
                TokenNode::Token(token) => {
                    let mut stack: Vec<String> = own_path.iter().cloned().collect();
                    let ctx = Context {
                        mode: None,
                        collection,
                    };
                    self.token(token, ctx, &mut stack).map(TokenNode::Token)
                }
                TokenNode::Modal(modes) => {
                    let mut kept = ModeMap::new();
                    for (mode, token) in modes {
                        let mut stack: Vec<String> = own_path.iter().cloned().collect();
                        let ctx = Context {
                            mode: Some(mode),
                            collection,
                        };
                        match self.token(token, ctx, &mut stack) {
                            Some(t) => {
                                kept.insert(mode.clone(), t);
                            }
                            None => debug!("dropping mode '{mode}' of {display_path}"),
                        }
                    }
                    (!kept.is_empty()).then_some(TokenNode::Modal(kept))
                }
            };

            match resolved {
                Some(node) => {
                    out.insert(key.clone(), node);
                }
                None => warn!("dropping token {display_path}: unresolved reference"),
            }
        }
        prune_empty(&mut out);
        out
    }

    fn token(
        &self,
        token: &DesignToken,
        ctx: Context<'_>,
        stack: &mut Vec<String>,
    ) -> Option<DesignToken> {
        let value = self.value(&token.value, ctx, stack)?;
        Some(DesignToken {
            value,
            ..token.clone()
        })
    }

    fn value(&self, value: &Value, ctx: Context<'_>, stack: &mut Vec<String>) -> Option<Value> {
        match value {
            Value::String(s) => self.string(s, ctx, stack),
            Value::Array(items) => items
                .iter()
                .map(|v| self.value(v, ctx, stack))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Value::Object(object) => object
                .iter()
                .map(|(k, v)| self.value(v, ctx, stack).map(|v| (k.clone(), v)))
                .collect::<Option<Map<_, _>>>()
                .map(Value::Object),
            other => Some(other.clone()),
        }
    }

    fn string(&self, text: &str, ctx: Context<'_>, stack: &mut Vec<String>) -> Option<Value> {
        if let Some(path) = as_reference(text) {
            return self.reference(path, ctx, stack);
        }

        let parts = segments(text);
        if !parts.iter().any(|s| matches!(s, Segment::Reference(_))) {
            return Some(Value::String(text.to_owned()));
        }

        let mut out = String::with_capacity(text.len());
        for part in parts {
            match part {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Reference(path) => match self.reference(path, ctx, stack)? {
                    Value::String(s) => out.push_str(&s),
                    Value::Number(n) => out.push_str(&n.to_string()),
                    Value::Bool(b) => out.push_str(if b { "true" } else { "false" }),
                    _ => {
                        warn!("reference {{{path}}} inside '{text}' is not a scalar");
                        return None;
                    }
                },
            }
        }
        Some(Value::String(out))
    }

    fn reference(&self, path: &str, ctx: Context<'_>, stack: &mut Vec<String>) -> Option<Value> {
        let Some((found, node)) = lookup(self.tree, path) else {
            warn!("unresolved reference {{{path}}}");
            return None;
        };
        if stack.contains(&found) {
            warn!("reference cycle: {} -> {found}", stack.join(" -> "));
            return None;
        }

        let target = match node {
            TokenNode::Token(t) => t,
            TokenNode::Modal(modes) => {
                let target_collection = found.split('.').next().unwrap_or_default();
                let Some(t) = self.pick_mode(modes, ctx, target_collection) else {
                    warn!(
                        "reference {{{path}}} has no value for mode '{}'",
                        ctx.mode
                            .or(self.default_mode.as_ref())
                            .map_or("<none>", ModeName::as_str)
                    );
                    return None;
                };
                t
            }
            TokenNode::Group(_) => {
                warn!("reference {{{path}}} points at a group");
                return None;
            }
        };

        stack.push(found);
        let resolved = self.value(&target.value, ctx, stack);
        stack.pop();
        resolved
    }

    /// The context mode when present, otherwise the default mode, otherwise
    /// the only mode of the target.
    ///
    /// The only-mode fallback never crosses between two modes of one theme: it
    /// is refused when that mode is declared by the collection resolution
    /// started in, or when the target's collection declares the wanted mode
    /// and this token just lacks it.
    fn pick_mode<'m>(
        &self,
        modes: &'m ModeMap,
        ctx: Context<'_>,
        target_collection: &str,
    ) -> Option<&'m DesignToken> {
        let preferred = ctx.mode.or(self.default_mode.as_ref());
        if let Some(t) = preferred.and_then(|m| modes.get(m)) {
            return Some(t);
        }
        if modes.len() != 1 {
            return None;
        }
        let (sole, token) = modes.first()?;
        if ctx.collection.is_some_and(|c| self.declares(c, sole)) {
            return None;
        }
        if preferred.is_some_and(|p| self.declares(target_collection, p)) {
            return None;
        }
        Some(token)
    }

    fn declares(&self, collection: &str, mode: &ModeName) -> bool {
        self.declared_modes
            .get(collection)
            .is_some_and(|modes| modes.contains(mode))
    }
}

fn collect_modes(group: &TokenGroup, out: &mut Vec<ModeName>) {
    for node in group.values() {
        match node {
            TokenNode::Group(inner) => collect_modes(inner, out),
            TokenNode::Modal(modes) => {
                for mode in modes.keys() {
                    if !out.contains(mode) {
                        out.push(mode.clone());
                    }
                }
            }
            TokenNode::Token(_) => {}
        }
    }
}

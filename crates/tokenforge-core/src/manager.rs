use crate::lifecycle::{validate_transition, LoadState};
use crate::loader::{load_manifest, load_sources};
use crate::resolve::Resolver;
use crate::styles::build_styles;
use crate::tree::{collapse_single_modes, count_tokens, lookup};
use crate::variables::build_variables;
use crate::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokenforge_schema::{
    keys_match, normalize_key, DesignToken, ModeName, NormalizedManifest, StyleCategory,
    TokenGroup, TokenNode,
};
use tracing::{debug, info};

pub type StyleTrees = BTreeMap<StyleCategory, TokenGroup>;

/// Options controlling how a token directory is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    /// Mode read from mode-keyed variables when a style references them.
    pub default_mode: Option<String>,
    /// Store single-mode variables as plain tokens instead of one-entry mode maps.
    pub collapse_single_mode: bool,
    /// Only load these modes; empty loads all.
    pub modes: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            default_mode: Some("Mode 1".to_owned()),
            collapse_single_mode: true,
            modes: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct LoadedTokens {
    manifest: NormalizedManifest,
    variables: TokenGroup,
    /// The resolved variables before single-mode collapse, kept when collapse
    /// is enabled so mode lookups still see mode keys.
    by_mode: Option<TokenGroup>,
    styles: StyleTrees,
}

/// Read-only facade over one token source directory.
///
/// Nothing is read until [`TokenManager::load`] succeeds; every query before
/// that fails with [`CoreError::NotLoaded`]. After loading, the trees are
/// never mutated.
#[derive(Debug)]
pub struct TokenManager {
    tokens_dir: PathBuf,
    options: LoadOptions,
    state: LoadState,
    loaded: Option<LoadedTokens>,
}

impl TokenManager {
    pub fn new(tokens_dir: impl Into<PathBuf>) -> Self {
        Self::with_options(tokens_dir, LoadOptions::default())
    }

    pub fn with_options(tokens_dir: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self {
            tokens_dir: tokens_dir.into(),
            options,
            state: LoadState::Unloaded,
            loaded: None,
        }
    }

    pub fn tokens_dir(&self) -> &Path {
        &self.tokens_dir
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// Load the manifest and every token file, then build and resolve the trees.
    ///
    /// A second call after a successful load does nothing. A manifest error
    /// fails the load and leaves the manager unloaded; a bad token file only
    /// logs a warning.
    pub async fn load(&mut self) -> Result<(), CoreError> {
        if self.is_loaded() {
            debug!("tokens already loaded from {}", self.tokens_dir.display());
            return Ok(());
        }

        validate_transition(self.state, LoadState::Loading)?;
        self.state = LoadState::Loading;

        let result = self.load_inner().await;
        match result {
            Ok(loaded) => {
                validate_transition(self.state, LoadState::Loaded)?;
                info!(
                    "loaded '{}': {} variables, {} styles",
                    loaded.manifest.name,
                    count_tokens(&loaded.variables),
                    loaded.styles.values().map(count_tokens).sum::<usize>()
                );
                self.loaded = Some(loaded);
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                validate_transition(self.state, LoadState::Unloaded)?;
                self.state = LoadState::Unloaded;
                Err(e)
            }
        }
    }

    async fn load_inner(&self) -> Result<LoadedTokens, CoreError> {
        info!("loading tokens from {}", self.tokens_dir.display());
        let manifest = load_manifest(&self.tokens_dir).await?;
        let files = load_sources(&self.tokens_dir, &manifest).await;

        let raw_variables = build_variables(&manifest.collections, &files, &self.options.modes);
        let raw_styles = build_styles(&manifest.styles, &files);

        let resolver = Resolver::new(&raw_variables)
            .with_default_mode(self.default_mode())
            .with_declared_modes(declared_modes(&manifest));
        let resolved = resolver.resolve_variables();
        let styles: StyleTrees = raw_styles
            .iter()
            .map(|(category, tree)| (*category, resolver.resolve_group(tree)))
            .collect();

        let (variables, by_mode) = if self.options.collapse_single_mode {
            (collapse_single_modes(resolved.clone()), Some(resolved))
        } else {
            (resolved, None)
        };

        Ok(LoadedTokens {
            manifest,
            variables,
            by_mode,
            styles,
        })
    }

    fn default_mode(&self) -> Option<ModeName> {
        self.options
            .default_mode
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ModeName::from_source)
    }

    fn loaded(&self) -> Result<&LoadedTokens, CoreError> {
        self.loaded.as_ref().ok_or(CoreError::NotLoaded)
    }

    pub fn manifest(&self) -> Result<&NormalizedManifest, CoreError> {
        Ok(&self.loaded()?.manifest)
    }

    /// The resolved variable tree, keyed by collection identifier.
    pub fn variables(&self) -> Result<&TokenGroup, CoreError> {
        Ok(&self.loaded()?.variables)
    }

    /// The resolved style trees of every declared category.
    pub fn styles(&self) -> Result<&StyleTrees, CoreError> {
        Ok(&self.loaded()?.styles)
    }

    pub fn style(&self, category: StyleCategory) -> Result<Option<&TokenGroup>, CoreError> {
        Ok(self.styles()?.get(&category))
    }

    /// The node at a dotted path of the variable tree, found with the same
    /// two-phase lookup references use.
    pub fn node(&self, path: &str) -> Result<Option<&TokenNode>, CoreError> {
        Ok(lookup(self.variables()?, path).map(|(_, node)| node))
    }

    /// The token at a dotted path, with a mode-keyed token folded into one
    /// record whose value maps mode to value. Groups yield `None`.
    pub fn token(&self, path: &str) -> Result<Option<DesignToken>, CoreError> {
        Ok(self.node(path)?.and_then(TokenNode::merged_modes))
    }

    /// A first-level group (collection) of the variable tree.
    pub fn subgroup(&self, name: &str) -> Result<Option<&TokenGroup>, CoreError> {
        let variables = self.variables()?;
        let direct = variables.get(name).or_else(|| {
            variables
                .iter()
                .find(|(key, _)| keys_match(key, name))
                .map(|(_, node)| node)
        });
        Ok(direct.and_then(TokenNode::as_group))
    }

    /// One entry of a subgroup, by normalized or source key.
    pub fn variable(&self, group: &str, key: &str) -> Result<Option<&TokenNode>, CoreError> {
        let Some(subgroup) = self.subgroup(group)? else {
            return Ok(None);
        };
        Ok(subgroup.get(&normalize_key(key)).or_else(|| subgroup.get(key)))
    }

    /// Resolve references in an arbitrary value against the variable tree.
    ///
    /// `mode` selects the value of mode-keyed targets; without it the
    /// configured default mode applies. `None` means a reference did not
    /// resolve.
    pub fn resolve_value(
        &self,
        value: &Value,
        mode: Option<&str>,
    ) -> Result<Option<Value>, CoreError> {
        let mode = mode.map(ModeName::from_source);
        let loaded = self.loaded()?;
        let tree = loaded.by_mode.as_ref().unwrap_or(&loaded.variables);
        let resolver = Resolver::new(tree)
            .with_default_mode(self.default_mode())
            .with_declared_modes(declared_modes(&loaded.manifest));
        Ok(resolver.resolve_value(value, mode.as_ref()))
    }

    /// Mode identifiers in manifest order, without duplicates.
    pub fn modes(&self) -> Result<Vec<&ModeName>, CoreError> {
        let mut out: Vec<&ModeName> = Vec::new();
        for mode in self
            .manifest()?
            .collections
            .iter()
            .flat_map(|c| c.modes.iter())
        {
            if !out.contains(&&mode.id) {
                out.push(&mode.id);
            }
        }
        Ok(out)
    }
}

fn declared_modes(manifest: &NormalizedManifest) -> Vec<(String, Vec<ModeName>)> {
    manifest
        .collections
        .iter()
        .map(|c| {
            let modes = c.modes.iter().map(|m| m.id.clone()).collect();
            (c.id.to_string(), modes)
        })
        .collect()
}

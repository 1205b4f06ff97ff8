use crate::CoreError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokenforge_schema::{
    parse_manifest_str, parse_token_group, ManifestError, NormalizedManifest, TokenGroup,
    MANIFEST_FILE_NAME,
};
use tracing::{debug, warn};

/// Raw token groups keyed by the file name the manifest lists them under.
///
/// A file that failed to load is present with an empty group.
#[derive(Debug, Default)]
pub struct LoadedFiles {
    files: BTreeMap<String, TokenGroup>,
}

impl LoadedFiles {
    pub fn get(&self, name: &str) -> Option<&TokenGroup> {
        self.files.get(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Groups for `names`, in the order given. Unknown names are skipped.
    pub fn in_order<'a>(&'a self, names: &'a [String]) -> impl Iterator<Item = &'a TokenGroup> {
        names.iter().filter_map(|name| self.files.get(name))
    }
}

impl FromIterator<(String, TokenGroup)> for LoadedFiles {
    fn from_iter<I: IntoIterator<Item = (String, TokenGroup)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// Read and validate `manifest.json` from a token source directory.
///
/// Any failure here is fatal to the load.
pub async fn load_manifest(tokens_dir: &Path) -> Result<NormalizedManifest, CoreError> {
    let path = tokens_dir.join(MANIFEST_FILE_NAME);
    let with_path = |source: ManifestError| CoreError::Manifest {
        path: path.clone(),
        source,
    };

    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| with_path(ManifestError::Io(e)))?;
    let manifest = parse_manifest_str(&content).map_err(with_path)?;
    let normalized = manifest.normalize().map_err(with_path)?;

    debug!(
        "manifest '{}': {} collections, {} style categories",
        normalized.name,
        normalized.collections.len(),
        normalized.styles.len()
    );
    Ok(normalized)
}

/// Read one token file. Missing or malformed files log a warning and yield
/// an empty group.
pub async fn load_token_file(path: PathBuf) -> TokenGroup {
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(c) => c,
        Err(e) => {
            warn!("failed to read token file {}: {e}", path.display());
            return TokenGroup::new();
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => parse_token_group(value),
        Err(e) => {
            warn!("failed to parse token file {}: {e}", path.display());
            TokenGroup::new()
        }
    }
}

/// Read every file the manifest references, concurrently.
///
/// All reads are spawned before any is awaited; the handles are then joined in
/// declaration order so the result never depends on completion order.
pub async fn load_sources(tokens_dir: &Path, manifest: &NormalizedManifest) -> LoadedFiles {
    let names: Vec<String> = manifest
        .all_files()
        .into_iter()
        .map(str::to_owned)
        .collect();

    let handles: Vec<_> = names
        .iter()
        .map(|name| tokio::spawn(load_token_file(tokens_dir.join(name))))
        .collect();

    let mut files = Vec::with_capacity(handles.len());
    for (name, handle) in names.into_iter().zip(handles) {
        let group = match handle.await {
            Ok(group) => group,
            Err(e) => {
                warn!("token file task for {name} failed: {e}");
                TokenGroup::new()
            }
        };
        files.push((name, group));
    }

    debug!("loaded {} token files", files.len());
    files.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokenforge_schema::parse_manifest_str;

    #[tokio::test]
    async fn missing_manifest_is_fatal_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(dir.path()).await.unwrap_err();
        match err {
            CoreError::Manifest { path, source } => {
                assert!(path.ends_with(MANIFEST_FILE_NAME));
                assert!(matches!(source, ManifestError::Io(_)));
            }
            other => panic!("expected manifest error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_manifest_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE_NAME), "{ not json").unwrap();
        let err = load_manifest(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("manifest.json"));
    }

    #[tokio::test]
    async fn bad_token_files_yield_empty_groups() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "[").unwrap();
        assert!(load_token_file(dir.path().join("broken.json")).await.is_empty());
        assert!(load_token_file(dir.path().join("absent.json")).await.is_empty());
    }

    #[tokio::test]
    async fn loads_every_listed_file_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{ "gap": { "$type": "dimension", "$value": "4px" } }"#,
        )
        .unwrap();
        let manifest = parse_manifest_str(
            r#"{ "collections": {
                "A": { "modes": { "Mode 1": ["a.json", "missing.json"] } },
                "B": { "modes": { "Mode 1": ["a.json"] } }
            } }"#,
        )
        .unwrap()
        .normalize()
        .unwrap();

        let loaded = load_sources(dir.path(), &manifest).await;
        assert_eq!(loaded.len(), 2);
        assert!(loaded.get("a.json").unwrap().contains_key("gap"));
        assert!(loaded.get("missing.json").unwrap().is_empty());

        let order: Vec<usize> = loaded
            .in_order(&["missing.json".to_owned(), "a.json".to_owned()])
            .map(TokenGroup::len)
            .collect();
        assert_eq!(order, vec![0, 1]);
    }
}

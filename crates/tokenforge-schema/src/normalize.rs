use crate::manifest::{Manifest, ManifestError, StyleCategory};
use crate::types::{CollectionId, ModeName};
use serde::{Deserialize, Serialize};

/// Validated manifest with identifiers resolved and file lists trimmed.
///
/// Collections, modes, and files keep their declaration order; that order is
/// the merge order of the variable tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedManifest {
    pub name: String,
    pub collections: Vec<NormalizedCollection>,
    pub styles: Vec<StyleSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedCollection {
    pub id: CollectionId,
    pub source_name: String,
    pub modes: Vec<NormalizedMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedMode {
    pub id: ModeName,
    pub source_name: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StyleSource {
    pub category: StyleCategory,
    pub files: Vec<String>,
}

impl Manifest {
    /// Validate names and resolve collection and mode identifiers.
    pub fn normalize(&self) -> Result<NormalizedManifest, ManifestError> {
        let mut collections: Vec<NormalizedCollection> =
            Vec::with_capacity(self.collections.len());
        for (name, section) in self.collections.iter() {
            let source_name = name.trim();
            if source_name.is_empty() {
                return Err(ManifestError::EmptyCollectionName);
            }

            let id = CollectionId::from_source(source_name);
            if let Some(existing) = collections.iter().find(|c| c.id == id) {
                return Err(ManifestError::CollectionCollision {
                    first: existing.source_name.clone(),
                    second: source_name.to_owned(),
                    normalized: id.into_inner(),
                });
            }

            let mut modes: Vec<NormalizedMode> = Vec::with_capacity(section.modes.len());
            for (mode_name, files) in section.modes.iter() {
                let mode_source = mode_name.trim();
                if mode_source.is_empty() {
                    return Err(ManifestError::EmptyModeName {
                        collection: source_name.to_owned(),
                    });
                }
                let id = ModeName::from_source(mode_source);
                if let Some(existing) = modes.iter().find(|m| m.id == id) {
                    return Err(ManifestError::ModeCollision {
                        collection: source_name.to_owned(),
                        first: existing.source_name.clone(),
                        second: mode_source.to_owned(),
                        normalized: id.into_inner(),
                    });
                }
                modes.push(NormalizedMode {
                    id,
                    source_name: mode_source.to_owned(),
                    files: normalize_file_list(files, &format!("{source_name}/{mode_source}"))?,
                });
            }

            collections.push(NormalizedCollection {
                id,
                source_name: source_name.to_owned(),
                modes,
            });
        }

        let mut styles = Vec::new();
        if let Some(section) = &self.styles {
            for category in StyleCategory::ALL {
                let files = normalize_file_list(section.files(category), category.as_str())?;
                if !files.is_empty() {
                    styles.push(StyleSource { category, files });
                }
            }
        }

        Ok(NormalizedManifest {
            name: self.name.trim().to_owned(),
            collections,
            styles,
        })
    }
}

impl NormalizedManifest {
    /// Every file the manifest references, in merge order, without duplicates.
    pub fn all_files(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let variable_files = self
            .collections
            .iter()
            .flat_map(|c| c.modes.iter())
            .flat_map(|m| m.files.iter());
        let style_files = self.styles.iter().flat_map(|s| s.files.iter());
        for file in variable_files.chain(style_files) {
            if !out.contains(&file.as_str()) {
                out.push(file);
            }
        }
        out
    }

    pub fn style_files(&self, category: StyleCategory) -> &[String] {
        self.styles
            .iter()
            .find(|s| s.category == category)
            .map_or(&[], |s| s.files.as_slice())
    }
}

fn normalize_file_list(files: &[String], owner: &str) -> Result<Vec<String>, ManifestError> {
    files
        .iter()
        .map(|f| {
            let trimmed = f.trim();
            if trimmed.is_empty() {
                Err(ManifestError::EmptyFileName {
                    owner: owner.to_owned(),
                })
            } else {
                Ok(trimmed.to_owned())
            }
        })
        .collect()
}

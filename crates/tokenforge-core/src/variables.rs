use crate::loader::LoadedFiles;
use crate::tree::{merge_groups, normalize_group, tag_mode};
use tokenforge_schema::{to_identifier, NormalizedCollection, TokenGroup, TokenNode};
use tracing::debug;

/// Merge every collection's per-mode files into one unresolved variable tree.
///
/// The first-level keys are collection identifiers. Every leaf is mode-keyed,
/// even when the collection has a single mode. Files merge in declaration
/// order: collection, then mode, then file within the mode.
///
/// A non-empty `mode_filter` keeps only the modes whose identifier matches one
/// of its entries (compared after identifier normalization).
pub fn build_variables(
    collections: &[NormalizedCollection],
    files: &LoadedFiles,
    mode_filter: &[String],
) -> TokenGroup {
    let wanted: Vec<String> = mode_filter.iter().map(|m| to_identifier(m)).collect();
    let mut tree = TokenGroup::new();

    for collection in collections {
        for mode in &collection.modes {
            if !wanted.is_empty() && !wanted.iter().any(|w| mode.id == w.as_str()) {
                debug!(
                    "skipping mode '{}' of collection '{}'",
                    mode.source_name, collection.source_name
                );
                continue;
            }

            for raw in files.in_order(&mode.files) {
                let tagged = tag_mode(normalize_group(raw.clone()), &mode.id);
                let mut contribution = TokenGroup::new();
                contribution.insert(collection.id.to_string(), TokenNode::Group(tagged));
                merge_groups(&mut tree, contribution);
            }
        }
    }

    tree
}

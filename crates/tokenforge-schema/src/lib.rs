//! Manifest parsing, key normalization, reference syntax, and the token model for tokenforge.
//!
//! This crate defines the schema layer: JSON manifest parsing (`Manifest`),
//! the validated, declaration-ordered form of a manifest (`NormalizedManifest`),
//! the canonical key normalizer (`normalize_key`), `{path}` reference parsing,
//! and the recursive token tree (`TokenNode`) that every other crate works on.

pub mod key;
pub mod manifest;
pub mod normalize;
pub mod reference;
pub mod token;
pub mod types;

pub use key::{keys_match, lower_first, normalize_key, to_identifier};
pub use manifest::{
    parse_manifest_file, parse_manifest_str, CollectionSection, Manifest, ManifestError,
    StyleCategory, StylesSection, MANIFEST_FILE_NAME,
};
pub use normalize::{NormalizedCollection, NormalizedManifest, NormalizedMode, StyleSource};
pub use reference::{as_reference, contains_reference, normalize_references, segments, Segment};
pub use token::{parse_token_group, DesignToken, ModeMap, TokenGroup, TokenNode, TokenType};
pub use types::{CollectionId, ModeName};

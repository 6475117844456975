//! Lexical Signature Index: per-type reference keyword sets.
//!
//! A document type may carry several template variants (e.g. year-over-year
//! revisions of the same form); each variant is one keyword set. The index is
//! loaded once at startup and never mutated.
//!
//! On-disk format is a JSON object mapping label to a list of keyword lists:
//! `{"1040_p1": [["1040", "filing", ...], ["1040", "irs", ...]], ...}`.

pub mod error;

pub use error::SignatureError;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use tracing::info;

/// Precomputed keyword template sets, keyed by document-type label.
#[derive(Debug, Clone)]
pub struct SignatureIndex {
    templates: BTreeMap<String, Vec<HashSet<String>>>,
}

impl SignatureIndex {
    /// Loads the index from a JSON file. An empty index is a load error:
    /// the keyword stage cannot score against nothing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SignatureError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SignatureError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed: BTreeMap<String, Vec<Vec<String>>> =
            serde_json::from_str(&raw).map_err(|source| SignatureError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if parsed.is_empty() {
            return Err(SignatureError::Empty {
                path: path.to_path_buf(),
            });
        }

        let index = Self::from_templates(parsed);
        info!(
            path = %path.display(),
            labels = index.len(),
            "signature index loaded"
        );
        Ok(index)
    }

    /// Builds an index from in-memory template lists. Keywords are lowercased
    /// so overlap scoring matches the page's token normalization.
    pub fn from_templates(templates: BTreeMap<String, Vec<Vec<String>>>) -> Self {
        let templates = templates
            .into_iter()
            .map(|(label, variants)| {
                let sets = variants
                    .into_iter()
                    .map(|keywords| keywords.into_iter().map(|k| k.to_lowercase()).collect())
                    .collect();
                (label.to_lowercase(), sets)
            })
            .collect();

        Self { templates }
    }

    /// Template keyword sets for `label`, or `None` for uncatalogued labels.
    pub fn templates_for(&self, label: &str) -> Option<&[HashSet<String>]> {
        self.templates.get(label).map(Vec::as_slice)
    }

    /// Catalogued labels, in sorted order (the order scoring iterates in).
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Label-keyed iteration over template sets, in sorted label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HashSet<String>])> {
        self.templates
            .iter()
            .map(|(label, sets)| (label.as_str(), sets.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

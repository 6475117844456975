//! Entity Resolution Engine: turns a classified page's extracted fields
//! into deduplicated entity rows plus page->entity crosswalks.
//!
//! Resolution is driven entirely by the declarative tables in
//! [`crate::mapping`]; there is no per-document-type code path here. A page
//! yields at most one entity per rule (in practice one business and one
//! person), and every resolved entity gets exactly one crosswalk row for
//! the page.

pub mod error;

pub use error::ResolveError;

use std::collections::BTreeMap;

use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::mapping::{self, IdentityRule};
use crate::page::Page;
use crate::store::{DocumentStore, EntityKind, MatchStrategy, NewEntity};

/// One resolved identity for a page.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub entity_id: Uuid,
    pub kind: EntityKind,
    /// Normalized identifier the entity was matched or created under.
    pub identifier: String,
}

/// Resolver over an injected store and matching strategy.
pub struct EntityResolver<S: DocumentStore> {
    store: S,
    strategy: MatchStrategy,
}

impl<S: DocumentStore> EntityResolver<S> {
    pub fn new(store: S, strategy: MatchStrategy) -> Self {
        Self { store, strategy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves entities for one page of a given document type.
    ///
    /// An unmapped label is a silent no-op. Rules whose identifier cannot
    /// be assembled from the extracted data are skipped with a warning.
    /// Crosswalks are written only after every rule has resolved.
    #[instrument(skip(self, page), fields(filename = %page.filename, page_number = page.page_number, doc_type))]
    pub async fn resolve_page(
        &self,
        page: &Page,
        doc_type: &str,
    ) -> Result<Vec<Resolution>, ResolveError> {
        let doc_type = mapping::normalize(doc_type);

        let Some(field_mapping) = mapping::field_mapping(&doc_type) else {
            debug!("no field mapping for document type, skipping resolution");
            return Ok(Vec::new());
        };

        let data = if field_mapping.cross_page {
            self.merged_upload_data(page).await?
        } else {
            self.store
                .fetch_extracted(&page.filename, page.page_number)
                .await?
        };

        let rules = mapping::identity_rules(&doc_type);
        let mut resolutions = Vec::with_capacity(rules.len());
        for rule in rules {
            if let Some(resolution) = self.apply_rule(rule, &data).await? {
                resolutions.push(resolution);
            }
        }

        for resolution in &resolutions {
            self.store
                .create_crosswalk(page.id, resolution.entity_id)
                .await?;
        }

        info!(entities = resolutions.len(), "page resolved");
        Ok(resolutions)
    }

    /// Merges extracted data across every page of the upload, ascending page
    /// order, later pages overwriting earlier values for the same key.
    async fn merged_upload_data(
        &self,
        page: &Page,
    ) -> Result<BTreeMap<String, String>, ResolveError> {
        let mut merged = BTreeMap::new();
        for page_number in self.store.page_numbers(&page.filename).await? {
            let data = self.store.fetch_extracted(&page.filename, page_number).await?;
            merged.extend(data);
        }
        Ok(merged)
    }

    async fn apply_rule(
        &self,
        rule: &IdentityRule,
        data: &BTreeMap<String, String>,
    ) -> Result<Option<Resolution>, ResolveError> {
        let Some(identifier) = rule.identifier.resolve_normalized(data) else {
            warn!(kind = %rule.kind, "identity fields missing, skipping rule");
            return Ok(None);
        };

        let entity_name = rule.entity_name.resolve(data).unwrap_or_default();

        let mut info = serde_json::Map::new();
        info.insert("entity_name".to_string(), json!(entity_name));
        for (key, spec) in rule.info {
            if let Some(value) = spec.resolve(data) {
                info.insert((*key).to_string(), json!(value));
            }
        }

        let entity_id = self
            .store
            .match_or_create_entity(
                NewEntity {
                    kind: rule.kind,
                    entity_name,
                    identifier: identifier.clone(),
                    additional_info: serde_json::Value::Object(info),
                },
                &self.strategy,
            )
            .await?;

        debug!(kind = %rule.kind, %entity_id, "rule resolved");
        Ok(Some(Resolution {
            entity_id,
            kind: rule.kind,
            identifier,
        }))
    }
}

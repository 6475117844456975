//! Relational store boundary: extracted fields, entities, crosswalks.
//!
//! Every call is synchronous from the pipeline's point of view and
//! individually committed; there is no shared transaction across a
//! resolution run. The one atomicity guarantee is
//! [`DocumentStore::match_or_create_entity`], which closes the
//! find-then-insert race for exact identifier matching.

pub mod error;
pub mod matcher;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod postgres;

pub use error::StoreError;
pub use matcher::MatchStrategy;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockDocumentStore;
pub use postgres::PgDocumentStore;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two entity roles the resolver distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Business,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Business => "business",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StoreError> {
        match value {
            "person" => Ok(EntityKind::Person),
            "business" => Ok(EntityKind::Business),
            other => Err(StoreError::MalformedRow {
                reason: format!("unknown entity type '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored, deduplicated real-world subject. Identity is established at
/// creation and never mutated in place; pages attach via crosswalk rows.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub entity_id: Uuid,
    pub kind: EntityKind,
    pub entity_name: String,
    /// Normalized identity signal this entity is keyed by.
    pub identifier: String,
    /// Free-form attribute bag (SSN-last-4, EIN, address, DOB, ...).
    pub additional_info: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Payload for entity creation.
#[derive(Debug, Clone)]
pub struct NewEntity {
    pub kind: EntityKind,
    pub entity_name: String,
    pub identifier: String,
    pub additional_info: serde_json::Value,
}

/// Store operations the resolution engine depends on.
pub trait DocumentStore: Send + Sync {
    /// Extracted key/value pairs for one page. Keys are unique per page.
    fn fetch_extracted(
        &self,
        filename: &str,
        page_number: u32,
    ) -> impl std::future::Future<Output = Result<BTreeMap<String, String>, StoreError>> + Send;

    /// Page numbers of an upload in storage order (ascending).
    fn page_numbers(
        &self,
        filename: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u32>, StoreError>> + Send;

    /// First stored entity of `kind` matching `identifier` under `strategy`.
    fn find_entity(
        &self,
        kind: EntityKind,
        identifier: &str,
        strategy: &MatchStrategy,
    ) -> impl std::future::Future<Output = Result<Option<Uuid>, StoreError>> + Send;

    /// Unconditionally inserts a new entity row.
    fn create_entity(
        &self,
        entity: NewEntity,
    ) -> impl std::future::Future<Output = Result<Uuid, StoreError>> + Send;

    /// Returns the matching entity's id, or creates one. Atomic for
    /// [`MatchStrategy::ExactNormalized`] (idempotent upsert keyed by
    /// (type, identifier)); find-then-insert inside a transaction for the
    /// fuzzy strategies.
    fn match_or_create_entity(
        &self,
        entity: NewEntity,
        strategy: &MatchStrategy,
    ) -> impl std::future::Future<Output = Result<Uuid, StoreError>> + Send;

    /// Records a page->entity association. Idempotent per pair; crosswalks
    /// are never updated or deleted.
    fn create_crosswalk(
        &self,
        page_id: Uuid,
        entity_id: Uuid,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

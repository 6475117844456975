//! Formsense library crate (used by the batch binary and integration tests).
//!
//! Classifies scanned document pages into a closed catalogue of form types and
//! resolves their extracted key/value data into deduplicated real-world
//! entities (persons and businesses) shared across unrelated uploads.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//! - [`Page`] - One rasterized, OCR'd page of an upload
//! - [`Classification`], [`ClassifierKind`] - Cascade output
//! - [`Resolution`] - One resolved (entity, role) association for a page
//!
//! ## Classification
//! - [`ClassificationCascade`] - keyword -> zero-shot text -> zero-shot image
//! - [`KeywordMatcher`], [`SignatureIndex`] - lexical signature scoring
//! - [`TextClassifier`], [`ImageClassifier`] - injected zero-shot handles
//!
//! ## Entity Resolution
//! - [`EntityResolver`] - match-or-create against the document store
//! - [`MatchStrategy`] - exact / substring / edit-distance identity matching
//! - [`DocumentStore`], [`PgDocumentStore`] - relational store boundary
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod classify;
pub mod config;
pub mod constants;
pub mod labels;
pub mod mapping;
pub mod page;
pub mod pipeline;
pub mod resolve;
pub mod scoring;
pub mod signatures;
pub mod store;

pub use classify::{
    CascadeConfig, Classification, ClassificationCascade, ClassifierKind, ClassifyError,
    HttpImageClassifier, HttpTextClassifier, ImageClassifier, KeywordMatcher, KeywordScores,
    TextClassifier, ZeroShotPrediction,
};
#[cfg(any(test, feature = "mock"))]
pub use classify::MockClassifier;

pub use config::{Config, ConfigError};
pub use labels::{UNKNOWN, UNKNOWN_TAX_FORM_TYPE, UNKNOWN_TEXT_TYPE, is_sentinel};
pub use mapping::{FieldMapping, IdentityRule, ValueSpec, field_mapping, identity_rules};
pub use page::{BoundingBox, Page};
pub use pipeline::{DocumentPipeline, PageOutcome, PipelineError};
pub use resolve::{EntityResolver, Resolution, ResolveError};
pub use signatures::{SignatureError, SignatureIndex};
pub use store::{
    DocumentStore, EntityKind, EntityRecord, MatchStrategy, NewEntity, PgDocumentStore, StoreError,
};
#[cfg(any(test, feature = "mock"))]
pub use store::MockDocumentStore;

use std::collections::BTreeMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use super::*;
use crate::classify::{ClassifierKind, MockClassifier};
use crate::labels::UNKNOWN;
use crate::page::{BoundingBox, Page};
use crate::signatures::SignatureIndex;
use crate::store::{EntityKind, MatchStrategy, MockDocumentStore};

fn index() -> SignatureIndex {
    let mut map = BTreeMap::new();
    map.insert(
        "business_license".to_string(),
        vec![vec![
            "license".to_string(),
            "issued".to_string(),
            "commerce".to_string(),
        ]],
    );
    SignatureIndex::from_templates(map)
}

/// Store-assigned page id, stable per (filename, page_number).
fn page_id(filename: &str, page_number: u32) -> Uuid {
    let mut hasher = DefaultHasher::new();
    filename.hash(&mut hasher);
    Uuid::from_u64_pair(hasher.finish(), u64::from(page_number))
}

fn page(filename: &str, words: &[&str]) -> Page {
    Page::from_ocr(
        page_id(filename, 1),
        filename,
        1,
        &format!("{filename}/page_1/preprocessed.png"),
        1000,
        1000,
        words.iter().map(|w| w.to_string()).collect(),
        words
            .iter()
            .map(|_| BoundingBox::new(0.0, 0.0, 1.0, 1.0))
            .collect(),
    )
}

fn pipeline(
    store: MockDocumentStore,
) -> DocumentPipeline<MockClassifier, MockClassifier, MockDocumentStore> {
    let cascade = ClassificationCascade::new(index(), MockClassifier::new(), MockClassifier::new());
    let resolver = EntityResolver::new(store, MatchStrategy::ExactNormalized);
    DocumentPipeline::new(cascade, resolver)
}

#[tokio::test]
async fn classified_page_resolves_entities() {
    let store = MockDocumentStore::new();
    store.insert_extracted(
        "license.pdf",
        1,
        [("business_name".to_string(), "Acme LLC".to_string())],
    );
    let pipeline = pipeline(store);

    let outcome = pipeline
        .process_page(&page("license.pdf", &["license", "issued", "commerce"]))
        .await
        .expect("process");

    assert_eq!(outcome.classification.label, "business_license");
    assert_eq!(
        outcome.classification.classifier,
        Some(ClassifierKind::KeywordMatching)
    );
    assert_eq!(outcome.resolutions.len(), 1);
    assert_eq!(outcome.resolutions[0].kind, EntityKind::Business);
    assert_eq!(pipeline.resolver().store().crosswalk_count(), 1);
}

#[tokio::test]
async fn sentinel_labels_skip_resolution() {
    let store = MockDocumentStore::new();
    store.insert_extracted(
        "noise.pdf",
        1,
        [("business_name".to_string(), "Acme LLC".to_string())],
    );
    let pipeline = pipeline(store);

    let outcome = pipeline
        .process_page(&page("noise.pdf", &["scribble"]))
        .await
        .expect("process");

    assert_eq!(outcome.classification.label, UNKNOWN);
    assert!(outcome.resolutions.is_empty());
    assert_eq!(pipeline.resolver().store().entity_count(), 0);
}

#[tokio::test]
async fn pages_are_processed_in_order_and_share_entities() {
    let store = MockDocumentStore::new();
    store.insert_extracted(
        "a.pdf",
        1,
        [("business_name".to_string(), "Acme LLC".to_string())],
    );
    store.insert_extracted(
        "b.pdf",
        1,
        [("business_name".to_string(), "acme llc".to_string())],
    );
    let pipeline = pipeline(store);

    let pages = vec![
        page("a.pdf", &["license", "issued", "commerce"]),
        page("b.pdf", &["license", "issued", "commerce"]),
    ];
    let outcomes = pipeline.process_pages(&pages).await.expect("process");

    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        outcomes[0].resolutions[0].entity_id,
        outcomes[1].resolutions[0].entity_id
    );
    assert_eq!(pipeline.resolver().store().entity_count(), 1);
    assert_eq!(pipeline.resolver().store().crosswalk_count(), 2);
}

#[tokio::test]
async fn classifier_failure_aborts_the_run() {
    let store = MockDocumentStore::new();
    let text = MockClassifier::new();
    text.fail_requests();
    let cascade = ClassificationCascade::new(index(), text, MockClassifier::new());
    let resolver = EntityResolver::new(store, MatchStrategy::ExactNormalized);
    let pipeline = DocumentPipeline::new(cascade, resolver);

    let err = pipeline
        .process_page(&page("x.pdf", &["scribble"]))
        .await
        .expect_err("service outage");

    assert!(matches!(err, PipelineError::Classify(_)));
}

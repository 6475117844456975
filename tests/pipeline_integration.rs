//! End-to-end pipeline tests over mock classifiers and an in-memory store.

mod common;

use formsense::classify::{ClassifierKind, MockClassifier};
use formsense::labels::{FALLBACK_CATALOGUE, UNKNOWN_TEXT_TYPE};
use formsense::store::{EntityKind, MockDocumentStore};

use common::{page, pipeline, seed};

fn prompt_for(label: &str) -> &'static str {
    FALLBACK_CATALOGUE
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(p, _)| *p)
        .expect("label in catalogue")
}

/// A three-page upload exercising all cascade outcomes: keyword hit with
/// resolution, zero-shot text hit with resolution, and a text-heavy page
/// that ends in a sentinel and resolves nothing.
#[tokio::test]
async fn mixed_upload_processes_every_page() {
    let store = MockDocumentStore::new();
    seed(&store, "packet.pdf", 1, &[
        ("named_insured_name", "Acme LLC"),
        ("named_insured_address", "1 Main St"),
    ]);
    seed(&store, "packet.pdf", 2, &[("renter_name", "Jane Doe")]);

    let text = MockClassifier::new();
    // Page 1 is decided by keywords; the text model is consulted for pages
    // 2 and 3, in order.
    text.push(prompt_for("lease_document"), 0.91);
    text.push(prompt_for("lease_document"), 0.10);

    let pipeline = pipeline(store, text, MockClassifier::new());

    let heavy_words: Vec<String> = (0..150).map(|i| format!("ledger{i:03}")).collect();
    let heavy_refs: Vec<&str> = heavy_words.iter().map(String::as_str).collect();

    let pages = vec![
        page("packet.pdf", 1, &["acord", "certificate", "liability", "insurance"]),
        page("packet.pdf", 2, &["premises", "tenancy", "rent"]),
        page("packet.pdf", 3, &heavy_refs),
    ];

    let outcomes = pipeline.process_pages(&pages).await.expect("process");
    assert_eq!(outcomes.len(), 3);

    assert_eq!(outcomes[0].classification.label, "acord_25");
    assert_eq!(
        outcomes[0].classification.classifier,
        Some(ClassifierKind::KeywordMatching)
    );
    assert_eq!(outcomes[0].resolutions.len(), 1);
    assert_eq!(outcomes[0].resolutions[0].kind, EntityKind::Business);
    assert_eq!(outcomes[0].resolutions[0].identifier, "acme llc");

    assert_eq!(outcomes[1].classification.label, "lease_document");
    assert_eq!(
        outcomes[1].classification.classifier,
        Some(ClassifierKind::TextClf)
    );
    assert_eq!(outcomes[1].resolutions.len(), 1);
    assert_eq!(outcomes[1].resolutions[0].kind, EntityKind::Person);

    assert_eq!(outcomes[2].classification.label, UNKNOWN_TEXT_TYPE);
    assert!(outcomes[2].resolutions.is_empty());

    let store = pipeline.resolver().store();
    assert_eq!(store.entity_count(), 2);
    assert_eq!(store.crosswalk_count(), 2);
}

/// The same business appearing in two separate uploads must resolve to one
/// entity with a crosswalk from each page.
#[tokio::test]
async fn entities_deduplicate_across_uploads() {
    let store = MockDocumentStore::new();
    seed(&store, "return_2023.pdf", 1, &[
        ("ein", "12-3456789"),
        ("business_name", "Acme LLC"),
    ]);
    seed(&store, "return_2024.pdf", 1, &[
        ("ein", "12-3456789"),
        ("business_name", "ACME LLC"),
    ]);

    let pipeline = pipeline(store, MockClassifier::new(), MockClassifier::new());

    let tax_words = ["1120s", "income", "deductions", "corporation"];
    let pages = vec![
        page("return_2023.pdf", 1, &tax_words),
        page("return_2024.pdf", 1, &tax_words),
    ];

    let outcomes = pipeline.process_pages(&pages).await.expect("process");

    assert_eq!(outcomes[0].classification.label, "1120s_p1");
    assert_eq!(outcomes[1].classification.label, "1120s_p1");
    assert_eq!(
        outcomes[0].resolutions[0].entity_id,
        outcomes[1].resolutions[0].entity_id
    );

    let store = pipeline.resolver().store();
    assert_eq!(store.entity_count(), 1);
    assert_eq!(store.crosswalk_count(), 2);

    let entity = &store.entities()[0];
    assert_eq!(entity.kind, EntityKind::Business);
    assert_eq!(entity.identifier, "12-3456789");
    // Attribute bag carries the display name and address fields.
    assert_eq!(entity.additional_info["entity_name"], "Acme LLC");
}

/// Reprocessing the same physical page is idempotent end to end: each run
/// re-ingests from the raw OCR output (fresh `Page` structs carrying the
/// same store-assigned page id), and no duplicate entities or crosswalks
/// appear.
#[tokio::test]
async fn reprocessing_is_idempotent() {
    let store = MockDocumentStore::new();
    seed(&store, "license.pdf", 1, &[("business_name", "Acme LLC")]);

    let pipeline = pipeline(store, MockClassifier::new(), MockClassifier::new());
    let words = ["license", "issued", "commerce"];

    let first_run = vec![page("license.pdf", 1, &words)];
    pipeline.process_pages(&first_run).await.expect("first run");

    let second_run = vec![page("license.pdf", 1, &words)];
    pipeline.process_pages(&second_run).await.expect("second run");

    assert_eq!(first_run[0].id, second_run[0].id, "page id must be stable across ingestions");

    let store = pipeline.resolver().store();
    assert_eq!(store.entity_count(), 1);
    assert_eq!(store.crosswalk_count(), 1);
}

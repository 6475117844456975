//! Shared fixtures for integration tests.

use std::collections::BTreeMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use uuid::Uuid;

use formsense::classify::{ClassificationCascade, MockClassifier};
use formsense::page::{BoundingBox, Page};
use formsense::pipeline::DocumentPipeline;
use formsense::resolve::EntityResolver;
use formsense::signatures::SignatureIndex;
use formsense::store::{MatchStrategy, MockDocumentStore};

/// Signature index with one keyword template per catalogued type used in
/// these tests.
pub fn signature_index() -> SignatureIndex {
    let mut templates: BTreeMap<String, Vec<Vec<String>>> = BTreeMap::new();
    templates.insert(
        "acord_25".to_string(),
        vec![strings(&[
            "acord",
            "certificate",
            "liability",
            "insurance",
            "insurer",
        ])],
    );
    templates.insert(
        "1120s_p1".to_string(),
        vec![strings(&[
            "1120s",
            "income",
            "deductions",
            "corporation",
            "shareholders",
        ])],
    );
    templates.insert(
        "business_license".to_string(),
        vec![strings(&["license", "issued", "commerce"])],
    );
    SignatureIndex::from_templates(templates)
}

pub fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Store-assigned page id: stable per (filename, page_number), the way the
/// pages table keys rows. Re-ingesting the same physical page must reuse it.
pub fn page_id(filename: &str, page_number: u32) -> Uuid {
    let mut hasher = DefaultHasher::new();
    filename.hash(&mut hasher);
    Uuid::from_u64_pair(hasher.finish(), u64::from(page_number))
}

/// OCR page with unit bounding boxes; geometry is irrelevant to these tests.
pub fn page(filename: &str, page_number: u32, words: &[&str]) -> Page {
    Page::from_ocr(
        page_id(filename, page_number),
        filename,
        page_number,
        &format!("{filename}/page_{page_number}/preprocessed.png"),
        1700,
        2200,
        strings(words),
        words
            .iter()
            .map(|_| BoundingBox::new(0.0, 0.0, 1.0, 1.0))
            .collect(),
    )
}

pub fn seed(store: &MockDocumentStore, filename: &str, page_number: u32, pairs: &[(&str, &str)]) {
    store.insert_extracted(
        filename,
        page_number,
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())),
    );
}

pub type MockPipeline = DocumentPipeline<MockClassifier, MockClassifier, MockDocumentStore>;

pub fn pipeline(
    store: MockDocumentStore,
    text: MockClassifier,
    image: MockClassifier,
) -> MockPipeline {
    let cascade = ClassificationCascade::new(signature_index(), text, image);
    let resolver = EntityResolver::new(store, MatchStrategy::ExactNormalized);
    DocumentPipeline::new(cascade, resolver)
}

//! Formsense batch entrypoint: classifies and resolves every page listed
//! in an OCR manifest.
//!
//! Usage: `formsense <manifest.json>` with `FORMSENSE_*` environment
//! variables for endpoints, thresholds, and the database URL.

use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use formsense::classify::{ClassificationCascade, HttpImageClassifier, HttpTextClassifier};
use formsense::config::Config;
use formsense::page::{BoundingBox, Page};
use formsense::pipeline::DocumentPipeline;
use formsense::resolve::EntityResolver;
use formsense::signatures::SignatureIndex;
use formsense::store::PgDocumentStore;

/// One OCR'd page as produced by the upstream preprocessing step.
/// `page_id` is the id of this page's row in the pages table, assigned when
/// the upload was registered; crosswalks written here must reference it.
#[derive(Debug, Deserialize)]
struct PageManifestEntry {
    page_id: Uuid,
    filename: String,
    page_number: u32,
    image_key: String,
    image_width: u32,
    image_height: u32,
    words: Vec<String>,
    bboxes: Vec<[f64; 4]>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let manifest_path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: formsense <manifest.json>")?;

    let index = SignatureIndex::load(&config.signature_index_path)?;
    tracing::info!(
        labels = index.len(),
        path = %config.signature_index_path.display(),
        "signature index loaded"
    );

    let http = reqwest::Client::new();
    let text = HttpTextClassifier::new(http.clone(), config.text_classifier_url.clone());
    let image = HttpImageClassifier::new(http, config.image_classifier_url.clone());
    let cascade = ClassificationCascade::with_config(index, text, image, (&config).into());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    let resolver = EntityResolver::new(PgDocumentStore::new(pool), config.match_strategy);

    let pipeline = DocumentPipeline::new(cascade, resolver);

    let manifest = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read manifest {}", manifest_path.display()))?;
    let entries: Vec<PageManifestEntry> =
        serde_json::from_str(&manifest).context("malformed page manifest")?;

    let pages: Vec<Page> = entries
        .into_iter()
        .map(|entry| {
            Page::from_ocr(
                entry.page_id,
                &entry.filename,
                entry.page_number,
                &entry.image_key,
                entry.image_width,
                entry.image_height,
                entry.words,
                entry.bboxes.into_iter().map(BoundingBox::from).collect(),
            )
        })
        .collect();
    tracing::info!(pages = pages.len(), "manifest parsed");

    let outcomes = pipeline.process_pages(&pages).await?;

    for outcome in &outcomes {
        tracing::info!(
            filename = %outcome.filename,
            page_number = outcome.page_number,
            label = %outcome.classification.label,
            score = outcome.classification.score,
            entities = outcome.resolutions.len(),
            "page processed"
        );
    }

    let classified = outcomes
        .iter()
        .filter(|o| !o.classification.is_sentinel())
        .count();
    tracing::info!(
        total = outcomes.len(),
        classified,
        unclassified = outcomes.len() - classified,
        "run complete"
    );

    Ok(())
}

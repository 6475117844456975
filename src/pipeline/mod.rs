//! Per-page orchestration: classify, then resolve entities when the label
//! is a catalogued type.

#[cfg(test)]
mod tests;

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::classify::{
    Classification, ClassificationCascade, ClassifyError, ImageClassifier, TextClassifier,
};
use crate::page::Page;
use crate::resolve::{EntityResolver, Resolution, ResolveError};
use crate::store::DocumentStore;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Everything the pipeline produced for one page.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub page_id: Uuid,
    pub filename: String,
    pub page_number: u32,
    pub classification: Classification,
    pub resolutions: Vec<Resolution>,
}

/// Classification cascade plus resolution engine behind one entry point.
pub struct DocumentPipeline<T: TextClassifier, I: ImageClassifier, S: DocumentStore> {
    cascade: ClassificationCascade<T, I>,
    resolver: EntityResolver<S>,
}

impl<T: TextClassifier, I: ImageClassifier, S: DocumentStore> DocumentPipeline<T, I, S> {
    pub fn new(cascade: ClassificationCascade<T, I>, resolver: EntityResolver<S>) -> Self {
        Self { cascade, resolver }
    }

    pub fn resolver(&self) -> &EntityResolver<S> {
        &self.resolver
    }

    /// Runs one page through classification and, for non-sentinel labels,
    /// entity resolution.
    #[instrument(skip(self, page), fields(filename = %page.filename, page_number = page.page_number))]
    pub async fn process_page(&self, page: &Page) -> Result<PageOutcome, PipelineError> {
        let classification = self.cascade.classify(page).await?;

        let resolutions = if classification.is_sentinel() {
            info!(label = %classification.label, "sentinel label, skipping resolution");
            Vec::new()
        } else {
            self.resolver.resolve_page(page, &classification.label).await?
        };

        Ok(PageOutcome {
            page_id: page.id,
            filename: page.filename.clone(),
            page_number: page.page_number,
            classification,
            resolutions,
        })
    }

    /// Processes pages sequentially in the order given. Earlier pages'
    /// entities are visible to later pages; the first failure aborts the
    /// run.
    pub async fn process_pages(&self, pages: &[Page]) -> Result<Vec<PageOutcome>, PipelineError> {
        let mut outcomes = Vec::with_capacity(pages.len());
        for page in pages {
            outcomes.push(self.process_page(page).await?);
        }
        Ok(outcomes)
    }
}

//! The classification cascade: three classifiers tried in strict order,
//! short-circuiting on the first confident result.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use crate::constants::{DEFAULT_KEYWORD_ACCEPT, DEFAULT_TEXT_HEAVY_CUTOFF, DEFAULT_ZERO_SHOT_ACCEPT};
use crate::labels::{self, UNKNOWN, UNKNOWN_TEXT_TYPE};
use crate::page::Page;
use crate::signatures::SignatureIndex;

use super::ClassifierKind;
use super::error::ClassifyError;
use super::keyword::KeywordMatcher;
use super::service::{ImageClassifier, TextClassifier, ZeroShotPrediction};

/// Stage thresholds. Defaults match the production values.
#[derive(Debug, Clone)]
pub struct CascadeConfig {
    /// Minimum raw overlap score to accept the keyword stage.
    pub keyword_accept: f64,
    /// Minimum top probability to accept a zero-shot stage.
    pub zero_shot_accept: f64,
    /// Token count above which a page skips the image stage and becomes
    /// `unknown_text_type`.
    pub text_heavy_cutoff: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            keyword_accept: DEFAULT_KEYWORD_ACCEPT,
            zero_shot_accept: DEFAULT_ZERO_SHOT_ACCEPT,
            text_heavy_cutoff: DEFAULT_TEXT_HEAVY_CUTOFF,
        }
    }
}

/// The cascade's single output: exactly one label per page.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Catalogued type string or sentinel. Never empty.
    pub label: String,
    /// Stage-dependent confidence: softmax probability for the keyword
    /// stage, top probability for zero-shot stages, 0 for sentinels.
    /// Always finite and in [0, 1].
    pub score: f64,
    /// Full probability distribution; only the keyword stage produces one.
    pub confidence_scores: Option<BTreeMap<String, f64>>,
    /// Raw per-label scores (keyword) or per-label probabilities (zero-shot).
    pub all_scores: Option<BTreeMap<String, f64>>,
    /// Which stage decided, `None` for sentinels reached without a decision.
    pub classifier: Option<ClassifierKind>,
}

impl Classification {
    fn sentinel(label: &str) -> Self {
        Self {
            label: label.to_string(),
            score: 0.0,
            confidence_scores: None,
            all_scores: None,
            classifier: None,
        }
    }

    /// Returns `true` when the label is one of the "could not classify"
    /// sentinels.
    pub fn is_sentinel(&self) -> bool {
        labels::is_sentinel(&self.label)
    }
}

/// Ordered classifier sequence with dependency-injected zero-shot handles.
pub struct ClassificationCascade<T: TextClassifier, I: ImageClassifier> {
    keywords: KeywordMatcher,
    text: T,
    image: I,
    config: CascadeConfig,
}

impl<T: TextClassifier, I: ImageClassifier> std::fmt::Debug for ClassificationCascade<T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationCascade")
            .field("keywords", &self.keywords)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: TextClassifier, I: ImageClassifier> ClassificationCascade<T, I> {
    pub fn new(index: SignatureIndex, text: T, image: I) -> Self {
        Self::with_config(index, text, image, CascadeConfig::default())
    }

    pub fn with_config(index: SignatureIndex, text: T, image: I, config: CascadeConfig) -> Self {
        Self {
            keywords: KeywordMatcher::new(index),
            text,
            image,
            config,
        }
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub fn text_classifier(&self) -> &T {
        &self.text
    }

    pub fn image_classifier(&self) -> &I {
        &self.image
    }

    /// Classifies one page. Infallible for "no match" (ends in a sentinel);
    /// classifier invocation failures propagate and are fatal for the page.
    #[instrument(skip(self, page), fields(filename = %page.filename, page_number = page.page_number))]
    pub async fn classify(&self, page: &Page) -> Result<Classification, ClassifyError> {
        // Stage 1: keyword matching. Select by softmax, gate by raw score.
        if let Some(scores) = self.keywords.score(&page.clf_tokens) {
            if scores.best_raw >= self.config.keyword_accept {
                info!(
                    label = %scores.best_label,
                    raw = scores.best_raw,
                    probability = scores.best_probability,
                    "keyword stage accepted"
                );
                return Ok(Classification {
                    label: scores.best_label,
                    score: scores.best_probability,
                    confidence_scores: Some(scores.confidence_scores),
                    all_scores: Some(scores.all_scores),
                    classifier: Some(ClassifierKind::KeywordMatching),
                });
            }
            debug!(
                best = %scores.best_label,
                raw = scores.best_raw,
                threshold = self.config.keyword_accept,
                "keyword stage below raw threshold"
            );
        }

        let prompts = labels::fallback_prompts();

        // Stage 2: zero-shot text over the fallback catalogue. The token set
        // is sorted before joining so the input is deterministic.
        let mut sorted_tokens: Vec<&str> = page.clf_tokens.iter().map(String::as_str).collect();
        sorted_tokens.sort_unstable();
        let text_input = sorted_tokens.join(" ");

        let prediction = self.text.classify(&text_input, &prompts).await?;
        if prediction.score >= self.config.zero_shot_accept {
            return self.accept_zero_shot(prediction, ClassifierKind::TextClf);
        }
        debug!(
            top_score = prediction.score,
            threshold = self.config.zero_shot_accept,
            "text stage below threshold"
        );

        // Stage 3: text-heavy pages never reach the image classifier; they
        // are assumed to be unclassifiable tax-form variants.
        if page.clf_token_count() > self.config.text_heavy_cutoff {
            info!(
                tokens = page.clf_token_count(),
                cutoff = self.config.text_heavy_cutoff,
                "text-heavy page, skipping image stage"
            );
            return Ok(Classification::sentinel(UNKNOWN_TEXT_TYPE));
        }

        // Stage 4: zero-shot image over the same catalogue.
        let prediction = self.image.classify(&page.image_key, &prompts).await?;
        if prediction.score >= self.config.zero_shot_accept {
            return self.accept_zero_shot(prediction, ClassifierKind::ImageClf);
        }
        debug!(
            top_score = prediction.score,
            threshold = self.config.zero_shot_accept,
            "image stage below threshold"
        );

        // Stage 5: every stage rejected.
        Ok(Classification::sentinel(UNKNOWN))
    }

    fn accept_zero_shot(
        &self,
        prediction: ZeroShotPrediction,
        kind: ClassifierKind,
    ) -> Result<Classification, ClassifyError> {
        let label = labels::canonical_fallback_label(&prediction.label).ok_or_else(|| {
            ClassifyError::UnknownFallbackLabel {
                label: prediction.label.clone(),
            }
        })?;

        // Re-key the score map by canonical labels so callers never see the
        // hypothesis prompts.
        let all_scores: BTreeMap<String, f64> = prediction
            .all_scores
            .iter()
            .map(|(prompt, score)| {
                let key = labels::canonical_fallback_label(prompt).unwrap_or(prompt.as_str());
                (key.to_string(), *score)
            })
            .collect();

        info!(label, score = prediction.score, stage = %kind, "zero-shot stage accepted");

        Ok(Classification {
            label: label.to_string(),
            score: prediction.score,
            confidence_scores: None,
            all_scores: Some(all_scores),
            classifier: Some(kind),
        })
    }
}

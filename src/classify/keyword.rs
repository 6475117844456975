//! Stage 1: keyword-overlap scoring against the lexical signature index.

use std::collections::{BTreeMap, HashSet};

use tracing::trace;

use crate::scoring::{argmax, scaled_softmax};
use crate::signatures::SignatureIndex;

/// Full scoring output of the keyword stage for one page.
#[derive(Debug, Clone)]
pub struct KeywordScores {
    /// Argmax of the softmax distribution.
    pub best_label: String,
    /// Unscaled mean-overlap score of the best label. This is what the
    /// cascade gates acceptance on.
    pub best_raw: f64,
    /// Softmax probability of the best label. This is what gets stored as
    /// the classification score when the stage accepts.
    pub best_probability: f64,
    /// Softmax distribution over all catalogued labels; sums to 1.
    pub confidence_scores: BTreeMap<String, f64>,
    /// Unscaled mean-overlap scores per label.
    pub all_scores: BTreeMap<String, f64>,
}

/// Scores a page's classification token set against every catalogued type.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    index: SignatureIndex,
}

impl KeywordMatcher {
    pub fn new(index: SignatureIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &SignatureIndex {
        &self.index
    }

    /// Scores `tokens` against every label's template variants.
    ///
    /// Per-template score is |intersection| / |template| (0 for an empty
    /// template); a label's raw score is the mean across its templates. The
    /// candidate label is selected from the softmax distribution over scaled
    /// raw scores; the caller decides acceptance from `best_raw`.
    ///
    /// Returns `None` only when the index has no labels to score against.
    pub fn score(&self, tokens: &HashSet<String>) -> Option<KeywordScores> {
        if self.index.is_empty() {
            return None;
        }

        let mut labels = Vec::with_capacity(self.index.len());
        let mut raw_scores = Vec::with_capacity(self.index.len());

        for (label, templates) in self.index.iter() {
            let raw = mean_overlap(tokens, templates);
            trace!(label, raw, "keyword overlap");
            labels.push(label.to_string());
            raw_scores.push(raw);
        }

        let probabilities = scaled_softmax(&raw_scores);
        let best = argmax(&probabilities)?;

        let confidence_scores: BTreeMap<String, f64> = labels
            .iter()
            .cloned()
            .zip(probabilities.iter().copied())
            .collect();
        let all_scores: BTreeMap<String, f64> = labels
            .iter()
            .cloned()
            .zip(raw_scores.iter().copied())
            .collect();

        Some(KeywordScores {
            best_label: labels[best].clone(),
            best_raw: raw_scores[best],
            best_probability: probabilities[best],
            confidence_scores,
            all_scores,
        })
    }
}

/// Mean of per-template overlap ratios for one label.
fn mean_overlap(tokens: &HashSet<String>, templates: &[HashSet<String>]) -> f64 {
    if templates.is_empty() {
        return 0.0;
    }

    let total: f64 = templates
        .iter()
        .map(|template| {
            if template.is_empty() {
                0.0
            } else {
                let intersection = template.intersection(tokens).count();
                intersection as f64 / template.len() as f64
            }
        })
        .sum();

    total / templates.len() as f64
}

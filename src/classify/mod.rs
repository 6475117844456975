//! Classification cascade: keyword matching, then zero-shot text, then
//! zero-shot image, with sentinel fallbacks.

pub mod cascade;
pub mod error;
pub mod keyword;
pub mod service;


pub use cascade::{CascadeConfig, Classification, ClassificationCascade};
pub use error::ClassifyError;
pub use keyword::{KeywordMatcher, KeywordScores};
#[cfg(any(test, feature = "mock"))]
pub use service::MockClassifier;
pub use service::{
    HttpImageClassifier, HttpTextClassifier, ImageClassifier, TextClassifier, ZeroShotPrediction,
};

/// Which cascade stage produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Stage 1: keyword overlap against the lexical signature index.
    KeywordMatching,
    /// Stage 2: zero-shot text entailment over the fallback catalogue.
    TextClf,
    /// Stage 4: zero-shot image/text similarity over the fallback catalogue.
    ImageClf,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierKind::KeywordMatching => "keyword_matching",
            ClassifierKind::TextClf => "text_clf",
            ClassifierKind::ImageClf => "image_clf",
        }
    }
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

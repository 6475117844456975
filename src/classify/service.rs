//! Dependency-injected zero-shot classifier handles.
//!
//! The cascade never loads models itself; it is constructed with service
//! handles implementing [`TextClassifier`] and [`ImageClassifier`]. The HTTP
//! implementations speak the standard zero-shot pipeline shape: a request
//! with candidate labels, a response with parallel `labels`/`scores` arrays
//! sorted by descending score.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use super::error::ClassifyError;

/// Raw wire shape of a zero-shot response.
#[derive(Debug, Clone, Deserialize)]
pub struct ZeroShotResponse {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

/// Normalized prediction: the winning candidate plus the full score map.
#[derive(Debug, Clone)]
pub struct ZeroShotPrediction {
    /// The winning candidate label (a fallback-catalogue prompt).
    pub label: String,
    /// Probability of the winning candidate.
    pub score: f64,
    /// Probability per candidate label.
    pub all_scores: BTreeMap<String, f64>,
}

impl TryFrom<ZeroShotResponse> for ZeroShotPrediction {
    type Error = ClassifyError;

    fn try_from(response: ZeroShotResponse) -> Result<Self, Self::Error> {
        if response.labels.is_empty() || response.labels.len() != response.scores.len() {
            return Err(ClassifyError::MalformedPrediction {
                reason: format!(
                    "{} labels with {} scores",
                    response.labels.len(),
                    response.scores.len()
                ),
            });
        }

        // Scores are probabilities; anything outside [0, 1] would leak past
        // the acceptance thresholds into stored classifications.
        if let Some(bad) = response
            .scores
            .iter()
            .find(|s| !s.is_finite() || !(0.0..=1.0).contains(*s))
        {
            return Err(ClassifyError::MalformedPrediction {
                reason: format!("score {bad} outside [0, 1]"),
            });
        }

        let all_scores: BTreeMap<String, f64> = response
            .labels
            .iter()
            .cloned()
            .zip(response.scores.iter().copied())
            .collect();

        // Do not trust the service's ordering; take the max ourselves.
        let (label, score) = response
            .labels
            .into_iter()
            .zip(response.scores)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or(ClassifyError::MalformedPrediction {
                reason: "empty prediction".to_string(),
            })?;

        Ok(Self {
            label,
            score,
            all_scores,
        })
    }
}

/// Zero-shot text classification over a fixed candidate catalogue.
pub trait TextClassifier: Send + Sync {
    fn classify(
        &self,
        text: &str,
        candidates: &[&str],
    ) -> impl std::future::Future<Output = Result<ZeroShotPrediction, ClassifyError>> + Send;
}

/// Zero-shot image classification over a fixed candidate catalogue. The page
/// image is addressed by its blob-store key; the service fetches it.
pub trait ImageClassifier: Send + Sync {
    fn classify(
        &self,
        image_key: &str,
        candidates: &[&str],
    ) -> impl std::future::Future<Output = Result<ZeroShotPrediction, ClassifyError>> + Send;
}

/// HTTP handle to a text zero-shot service (entailment-style).
#[derive(Debug, Clone)]
pub struct HttpTextClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTextClassifier {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextClassifier for HttpTextClassifier {
    async fn classify(
        &self,
        text: &str,
        candidates: &[&str],
    ) -> Result<ZeroShotPrediction, ClassifyError> {
        debug!(endpoint = %self.endpoint, text_len = text.len(), "text zero-shot request");

        let body = serde_json::json!({
            "inputs": text,
            "candidate_labels": candidates,
        });

        let response: ZeroShotResponse = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClassifyError::Service {
                reason: e.to_string(),
            })?
            .json()
            .await
            .map_err(|e| ClassifyError::MalformedPrediction {
                reason: e.to_string(),
            })?;

        response.try_into()
    }
}

/// HTTP handle to an image/text similarity zero-shot service.
#[derive(Debug, Clone)]
pub struct HttpImageClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpImageClassifier {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ImageClassifier for HttpImageClassifier {
    async fn classify(
        &self,
        image_key: &str,
        candidates: &[&str],
    ) -> Result<ZeroShotPrediction, ClassifyError> {
        debug!(endpoint = %self.endpoint, image_key, "image zero-shot request");

        let body = serde_json::json!({
            "image_key": image_key,
            "candidate_labels": candidates,
        });

        let response: ZeroShotResponse = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClassifyError::Service {
                reason: e.to_string(),
            })?
            .json()
            .await
            .map_err(|e| ClassifyError::MalformedPrediction {
                reason: e.to_string(),
            })?;

        response.try_into()
    }
}

/// Scripted classifier for tests: pops queued predictions, counts
/// invocations, and can be switched into a failing mode.
///
/// With an empty queue it returns a zero-confidence prediction for the first
/// candidate, so the cascade's threshold gate rejects the stage.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct MockClassifier {
    queue: std::sync::Mutex<std::collections::VecDeque<ZeroShotPrediction>>,
    calls: std::sync::atomic::AtomicUsize,
    fail: std::sync::atomic::AtomicBool,
}

#[cfg(any(test, feature = "mock"))]
impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a prediction for the winning `prompt` with `score`; all other
    /// candidates receive zero.
    pub fn push(&self, prompt: &str, score: f64) {
        self.queue
            .lock()
            .expect("lock poisoned")
            .push_back(ZeroShotPrediction {
                label: prompt.to_string(),
                score,
                all_scores: BTreeMap::from([(prompt.to_string(), score)]),
            });
    }

    /// Makes every subsequent call fail with a service error.
    pub fn fail_requests(&self) {
        self.fail.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of classify calls observed.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn next(&self, candidates: &[&str]) -> Result<ZeroShotPrediction, ClassifyError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(ClassifyError::Service {
                reason: "mock classifier set to fail".to_string(),
            });
        }

        if let Some(prediction) = self.queue.lock().expect("lock poisoned").pop_front() {
            return Ok(prediction);
        }

        let label = candidates.first().copied().unwrap_or_default().to_string();
        Ok(ZeroShotPrediction {
            label: label.clone(),
            score: 0.0,
            all_scores: candidates
                .iter()
                .map(|c| (c.to_string(), 0.0))
                .collect(),
        })
    }
}

#[cfg(any(test, feature = "mock"))]
impl TextClassifier for MockClassifier {
    async fn classify(
        &self,
        _text: &str,
        candidates: &[&str],
    ) -> Result<ZeroShotPrediction, ClassifyError> {
        self.next(candidates)
    }
}

#[cfg(any(test, feature = "mock"))]
impl ImageClassifier for MockClassifier {
    async fn classify(
        &self,
        _image_key: &str,
        candidates: &[&str],
    ) -> Result<ZeroShotPrediction, ClassifyError> {
        self.next(candidates)
    }
}

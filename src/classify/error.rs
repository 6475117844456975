use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by classifier invocations.
///
/// The cascade never fails for "no match" (that path ends in a sentinel
/// label); these errors are infrastructure failures and are fatal for the
/// current page, with no retry inside the cascade.
pub enum ClassifyError {
    /// A zero-shot service call failed (transport or non-2xx status).
    #[error("zero-shot service request failed: {reason}")]
    Service {
        /// Error message.
        reason: String,
    },

    /// The service responded, but the prediction is unusable.
    #[error("zero-shot service returned a malformed prediction: {reason}")]
    MalformedPrediction {
        /// Error message.
        reason: String,
    },

    /// The winning prompt is not in the fallback translation table.
    #[error("classifier returned unrecognized fallback label '{label}'")]
    UnknownFallbackLabel {
        /// The untranslatable prompt.
        label: String,
    },
}

//! Shared thresholds and scoring constants.

/// Minimum raw keyword-overlap score required to accept the keyword stage.
///
/// The keyword stage selects its candidate from the softmax distribution but
/// gates acceptance on the unscaled overlap score, so a softmax winner with
/// negligible absolute overlap still falls through to the zero-shot stages.
pub const DEFAULT_KEYWORD_ACCEPT: f64 = 0.5;

/// Minimum top probability required to accept a zero-shot (text or image) stage.
pub const DEFAULT_ZERO_SHOT_ACCEPT: f64 = 0.6;

/// Classification-ready token count above which a page that failed the keyword
/// and text stages is labeled `unknown_text_type` without an image attempt.
pub const DEFAULT_TEXT_HEAVY_CUTOFF: usize = 100;

/// Multiplier applied to raw keyword-overlap scores before softmax. Overlap
/// scores live in [0, 1], which is too flat for softmax to separate.
pub const RAW_SCORE_SCALE: f64 = 100.0;

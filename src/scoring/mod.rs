//! Shared score normalization used by the classification cascade.
//!
//! Keyword-overlap scores live in [0, 1] and are too flat for softmax to
//! separate, so they are scaled by [`RAW_SCORE_SCALE`] before exponentiation.

#[cfg(test)]
mod tests;

pub use crate::constants::RAW_SCORE_SCALE;

/// Numerically-stabilized softmax. Empty input yields an empty output.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();

    exps.into_iter().map(|e| e / sum).collect()
}

/// Softmax over raw overlap scores scaled by [`RAW_SCORE_SCALE`].
pub fn scaled_softmax(raw_scores: &[f64]) -> Vec<f64> {
    let scaled: Vec<f64> = raw_scores.iter().map(|s| s * RAW_SCORE_SCALE).collect();
    softmax(&scaled)
}

/// Index of the largest value; ties resolve to the first occurrence so the
/// result is deterministic for a fixed input order.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

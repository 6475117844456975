use super::*;

const TOLERANCE: f64 = 1e-9;

#[test]
fn softmax_sums_to_one() {
    let probs = softmax(&[0.1, 0.4, 0.2, 0.0]);
    let sum: f64 = probs.iter().sum();
    assert!((sum - 1.0).abs() < TOLERANCE, "sum was {sum}");
}

#[test]
fn scaled_softmax_sums_to_one() {
    let probs = scaled_softmax(&[0.8, 0.3, 0.3, 0.0]);
    let sum: f64 = probs.iter().sum();
    assert!((sum - 1.0).abs() < TOLERANCE, "sum was {sum}");
    assert!(probs.iter().all(|p| p.is_finite() && (0.0..=1.0).contains(p)));
}

#[test]
fn scaled_softmax_separates_overlap_scores() {
    // 0.8 vs 0.3 raw overlap: after x100 scaling the winner should carry
    // essentially all the probability mass.
    let probs = scaled_softmax(&[0.8, 0.3]);
    assert!(probs[0] > 0.99);
    assert!(probs[1] < 0.01);
}

#[test]
fn uniform_input_yields_uniform_distribution() {
    let probs = scaled_softmax(&[0.0, 0.0, 0.0, 0.0]);
    for p in &probs {
        assert!((p - 0.25).abs() < TOLERANCE);
    }
}

#[test]
fn softmax_is_stable_for_large_inputs() {
    // exp(1000) would overflow without max subtraction.
    let probs = softmax(&[1000.0, 999.0]);
    assert!(probs.iter().all(|p| p.is_finite()));
    assert!(probs[0] > probs[1]);
}

#[test]
fn softmax_empty_input() {
    assert!(softmax(&[]).is_empty());
    assert!(argmax(&[]).is_none());
}

#[test]
fn argmax_prefers_first_on_tie() {
    assert_eq!(argmax(&[0.3, 0.5, 0.5]), Some(1));
    assert_eq!(argmax(&[0.5, 0.2, 0.1]), Some(0));
}

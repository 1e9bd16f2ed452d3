//! Numerically stable softmax over raw class scores.

/// Converts raw scores into a probability distribution.
///
/// The maximum score is subtracted before exponentiation so that large
/// logits do not overflow. For a non-empty input the result entries are all
/// non-negative and sum to 1 (within floating-point tolerance); an empty
/// input yields an empty output.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let Some(max) = scores
        .iter()
        .copied()
        .fold(None::<f32>, |acc, v| Some(acc.map_or(v, |m| m.max(v))))
    else {
        return Vec::new();
    };

    let mut exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 {
        for e in &mut exps {
            *e /= sum;
        }
    }
    exps
}

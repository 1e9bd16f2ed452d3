//! Top-k selection over a probability vector.

/// Returns the `k` highest-scoring `(index, score)` pairs in descending
/// score order.
///
/// Ties are broken by the lower class index, which makes the ranking fully
/// deterministic for any input. When `k` exceeds the number of classes the
/// whole vector is ranked.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    indexed.truncate(k.min(scores.len()));
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descending_order() {
        let result = top_k(&[0.1, 0.8, 0.05, 0.05], 4);
        assert_eq!(result[0], (1, 0.8));
        assert_eq!(result[1], (0, 0.1));
        for pair in result.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_ties_broken_by_lower_index() {
        let result = top_k(&[0.25, 0.25, 0.25, 0.25], 4);
        let indexes: Vec<usize> = result.iter().map(|&(i, _)| i).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_tie_at_cutoff_prefers_lower_index() {
        let result = top_k(&[0.2, 0.4, 0.2, 0.2], 2);
        assert_eq!(result[0].0, 1);
        assert_eq!(result[1].0, 0);
    }

    #[test]
    fn test_k_larger_than_input() {
        let result = top_k(&[0.6, 0.4], 5);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_k_zero_and_empty_input() {
        assert!(top_k(&[0.5, 0.5], 0).is_empty());
        assert!(top_k(&[], 3).is_empty());
    }
}

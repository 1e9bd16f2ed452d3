//! Score postprocessing into a ranked prediction list.
//!
//! The predictor runs the model backend on a preprocessed tensor, converts
//! the raw scores to probabilities, ranks the top entries, maps class
//! indexes to labels, and drops everything below the confidence threshold.

use crate::core::config::ScoreActivation;
use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::core::inference::ScoreModel;
use crate::core::labels::LabelTable;
use crate::core::tensor::Tensor4D;
use crate::processors::{softmax, top_k};
use serde::Serialize;
use std::sync::Arc;

/// A single ranked prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Human-readable class label.
    pub label: String,
    /// Probability in `[0, 1]`.
    pub confidence: f32,
}

/// The ranked, filtered result of one classification request.
///
/// `predictions` is ordered by descending confidence and may be empty when
/// nothing clears the threshold; an empty list is a valid response, not an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Ranked predictions above the confidence threshold.
    pub predictions: Vec<Prediction>,
    /// Number of returned predictions.
    pub count: usize,
}

/// Runs a model backend and converts its scores into a [`Classification`].
#[derive(Debug)]
pub struct Predictor<M: ScoreModel> {
    model: M,
    labels: Arc<LabelTable>,
    activation: ScoreActivation,
    top_k: usize,
    threshold: f32,
}

impl<M: ScoreModel> Predictor<M> {
    /// Creates a predictor over a model backend and label table.
    pub fn new(
        model: M,
        labels: Arc<LabelTable>,
        activation: ScoreActivation,
        top_k: usize,
        threshold: f32,
    ) -> Self {
        Self {
            model,
            labels,
            activation,
            top_k,
            threshold,
        }
    }

    /// The backend's model name.
    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// The label table shared with this predictor.
    pub fn labels(&self) -> &Arc<LabelTable> {
        &self.labels
    }

    /// The configured confidence threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Classifies a preprocessed tensor with the configured threshold.
    pub fn infer(&self, input: &Tensor4D) -> ClassifyResult<Classification> {
        self.infer_with_threshold(input, self.threshold)
    }

    /// Classifies a preprocessed tensor with an explicit threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::ShapeMismatch`] when the model's class count
    /// disagrees with the label table, and propagates backend failures as
    /// inference errors.
    pub fn infer_with_threshold(
        &self,
        input: &Tensor4D,
        threshold: f32,
    ) -> ClassifyResult<Classification> {
        let scores = self.model.infer(input)?;

        if scores.nrows() != 1 {
            return Err(ClassifyError::invalid_input(format!(
                "expected a single-image batch, model returned {} rows",
                scores.nrows()
            )));
        }
        let row = scores.row(0);
        if row.len() != self.labels.len() {
            return Err(ClassifyError::ShapeMismatch {
                expected: self.labels.len(),
                actual: row.len(),
            });
        }

        let raw = row.to_vec();
        let probabilities = match self.activation {
            ScoreActivation::Softmax => softmax(&raw),
            ScoreActivation::Identity => raw,
        };

        let mut predictions = Vec::new();
        for (index, confidence) in top_k(&probabilities, self.top_k) {
            if confidence < threshold {
                continue;
            }
            let label = self.labels.lookup(index)?;
            predictions.push(Prediction {
                label: label.to_string(),
                confidence,
            });
        }

        tracing::debug!(
            model = self.model.model_name(),
            count = predictions.len(),
            top_confidence = predictions.first().map(|p| p.confidence),
            "classification complete"
        );

        Ok(Classification {
            count: predictions.len(),
            predictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tensor::Tensor2D;

    /// Backend returning a fixed score row, for exercising postprocessing.
    #[derive(Debug)]
    struct FixedScores(Vec<f32>);

    impl ScoreModel for FixedScores {
        fn infer(&self, _input: &Tensor4D) -> ClassifyResult<Tensor2D> {
            Ok(Tensor2D::from_shape_vec((1, self.0.len()), self.0.clone()).unwrap())
        }

        fn model_name(&self) -> &str {
            "fixed-scores"
        }
    }

    /// Backend that always fails, for exercising error propagation.
    #[derive(Debug)]
    struct FailingModel;

    impl ScoreModel for FailingModel {
        fn infer(&self, _input: &Tensor4D) -> ClassifyResult<Tensor2D> {
            Err(ClassifyError::inference_error(
                "failing-model",
                "forward pass",
                crate::core::errors::SimpleError::new("backend unavailable"),
            ))
        }

        fn model_name(&self) -> &str {
            "failing-model"
        }
    }

    fn table(n: usize) -> Arc<LabelTable> {
        Arc::new(LabelTable::new((0..n).map(|i| format!("class-{}", i))))
    }

    fn input() -> Tensor4D {
        Tensor4D::zeros((1, 3, 224, 224))
    }

    #[test]
    fn test_ranked_and_filtered() {
        let predictor = Predictor::new(
            FixedScores(vec![1.0, 5.0, 3.0, 0.0]),
            table(4),
            ScoreActivation::Softmax,
            5,
            0.01,
        );
        let result = predictor.infer(&input()).unwrap();

        assert_eq!(result.predictions[0].label, "class-1");
        for pair in result.predictions.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for p in &result.predictions {
            assert!(p.confidence >= 0.01);
        }
        assert_eq!(result.count, result.predictions.len());
    }

    #[test]
    fn test_threshold_one_yields_empty() {
        let predictor = Predictor::new(
            FixedScores(vec![2.0, 1.0, 0.5]),
            table(3),
            ScoreActivation::Softmax,
            5,
            0.05,
        );
        let result = predictor.infer_with_threshold(&input(), 1.0).unwrap();
        assert!(result.predictions.is_empty());
        assert_eq!(result.count, 0);
    }

    #[test]
    fn test_shape_mismatch_detected() {
        let predictor = Predictor::new(
            FixedScores(vec![1.0, 2.0, 3.0]),
            table(1000),
            ScoreActivation::Softmax,
            5,
            0.05,
        );
        let err = predictor.infer(&input()).unwrap_err();
        match err {
            ClassifyError::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, 1000);
                assert_eq!(actual, 3);
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_identity_activation_skips_softmax() {
        let predictor = Predictor::new(
            FixedScores(vec![0.7, 0.2, 0.1]),
            table(3),
            ScoreActivation::Identity,
            2,
            0.05,
        );
        let result = predictor.infer(&input()).unwrap();
        assert!((result.predictions[0].confidence - 0.7).abs() < 1e-6);
        assert!((result.predictions[1].confidence - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_limits_candidates() {
        let predictor = Predictor::new(
            FixedScores(vec![0.0; 10]),
            table(10),
            ScoreActivation::Softmax,
            3,
            0.0,
        );
        let result = predictor.infer(&input()).unwrap();
        assert_eq!(result.predictions.len(), 3);
        // Uniform scores tie-break by lower index.
        assert_eq!(result.predictions[0].label, "class-0");
    }

    #[test]
    fn test_backend_failure_propagates() {
        let predictor =
            Predictor::new(FailingModel, table(3), ScoreActivation::Softmax, 5, 0.05);
        let err = predictor.infer(&input()).unwrap_err();
        assert!(matches!(err, ClassifyError::Inference { .. }));
    }
}

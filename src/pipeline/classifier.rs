//! The image classification pipeline facade.
//!
//! [`ImageClassifier`] composes the preprocessor and predictor into the
//! single entry point the serving layer calls: image bytes in, ranked
//! predictions out. Construction goes through [`ImageClassifierBuilder`],
//! which validates configuration, loads the label table, and builds the
//! ONNX session pool once; the built classifier is immutable and shared
//! across concurrent requests.

use crate::core::config::{ClassifierConfig, ConfigValidator, OrtSessionConfig, ScoreActivation};
use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::core::inference::{OrtInfer, ScoreModel};
use crate::core::labels::LabelTable;
use crate::pipeline::predictor::{Classification, Predictor};
use crate::pipeline::preprocess::{decode_image, Preprocessor};
use crate::processors::ResizePolicy;
use image::RgbImage;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Number of images above which batch decoding goes parallel.
const PARALLEL_DECODE_THRESHOLD: usize = 8;

/// End-to-end classification pipeline: decode, preprocess, infer, rank.
#[derive(Debug)]
pub struct ImageClassifier<M: ScoreModel = OrtInfer> {
    preprocessor: Preprocessor,
    predictor: Predictor<M>,
}

impl<M: ScoreModel> ImageClassifier<M> {
    /// Assembles a classifier from an already-built preprocessor and
    /// predictor. Used directly by tests and alternative backends; ONNX
    /// deployments go through [`ImageClassifierBuilder`].
    pub fn from_parts(preprocessor: Preprocessor, predictor: Predictor<M>) -> Self {
        Self {
            preprocessor,
            predictor,
        }
    }

    /// The backend's model name.
    pub fn model_name(&self) -> &str {
        self.predictor.model_name()
    }

    /// The configured confidence threshold.
    pub fn threshold(&self) -> f32 {
        self.predictor.threshold()
    }

    /// Classifies encoded image bytes with the configured threshold.
    pub fn classify(&self, bytes: &[u8]) -> ClassifyResult<Classification> {
        self.classify_with_threshold(bytes, self.predictor.threshold())
    }

    /// Classifies encoded image bytes with an explicit threshold.
    pub fn classify_with_threshold(
        &self,
        bytes: &[u8],
        threshold: f32,
    ) -> ClassifyResult<Classification> {
        let img = decode_image(bytes)?;
        self.classify_image_with_threshold(&img, threshold)
    }

    /// Classifies an already-decoded RGB image.
    pub fn classify_image(&self, img: &RgbImage) -> ClassifyResult<Classification> {
        self.classify_image_with_threshold(img, self.predictor.threshold())
    }

    /// Classifies an already-decoded RGB image with an explicit threshold.
    pub fn classify_image_with_threshold(
        &self,
        img: &RgbImage,
        threshold: f32,
    ) -> ClassifyResult<Classification> {
        let tensor = self.preprocessor.transform(img)?;
        self.predictor.infer_with_threshold(&tensor, threshold)
    }

    /// Classifies several independent images, decoding and preprocessing in
    /// parallel when the batch is large enough. Each element fails or
    /// succeeds on its own.
    pub fn classify_batch(
        &self,
        items: &[impl AsRef<[u8]> + Sync],
    ) -> Vec<ClassifyResult<Classification>> {
        if items.len() > PARALLEL_DECODE_THRESHOLD {
            items
                .par_iter()
                .map(|bytes| self.classify(bytes.as_ref()))
                .collect()
        } else {
            items
                .iter()
                .map(|bytes| self.classify(bytes.as_ref()))
                .collect()
        }
    }
}

impl ImageClassifier<OrtInfer> {
    /// Creates a builder for an ONNX-backed classifier.
    pub fn builder() -> ImageClassifierBuilder {
        ImageClassifierBuilder::new()
    }

    /// Builds an ONNX-backed classifier from a validated configuration and
    /// label table.
    pub fn new(config: ClassifierConfig, labels: LabelTable) -> ClassifyResult<Self> {
        config.validate().map_err(ClassifyError::from)?;
        if labels.is_empty() {
            return Err(ClassifyError::config_error(
                "label table must not be empty",
            ));
        }

        let model = OrtInfer::from_config(&config.model)?;
        tracing::info!(
            model = model.model_name(),
            classes = labels.len(),
            threshold = config.confidence_threshold,
            "classifier initialized"
        );

        let preprocessor = Preprocessor::from_config(&config)?;
        let predictor = Predictor::new(
            model,
            Arc::new(labels),
            config.activation,
            config.top_k,
            config.confidence_threshold,
        );
        Ok(Self::from_parts(preprocessor, predictor))
    }
}

/// Builder for an ONNX-backed [`ImageClassifier`].
pub struct ImageClassifierBuilder {
    config: ClassifierConfig,
    labels_path: Option<PathBuf>,
    labels: Option<LabelTable>,
}

impl ImageClassifierBuilder {
    /// Creates a builder with the ImageNet defaults.
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
            labels_path: None,
            labels: None,
        }
    }

    /// Sets the path to the ONNX model file.
    pub fn model_path(mut self, model_path: impl Into<PathBuf>) -> Self {
        self.config.model = self.config.model.model_path(model_path);
        self
    }

    /// Sets the model name used in logs and error context.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.config.model = self.config.model.model_name(model_name);
        self
    }

    /// Sets the model input tensor name, overriding auto-detection.
    pub fn input_name(mut self, input_name: impl Into<String>) -> Self {
        self.config.model = self.config.model.input_name(input_name);
        self
    }

    /// Sets the session pool size for concurrent predictions.
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.config.model = self.config.model.session_pool_size(size);
        self
    }

    /// Sets the ONNX Runtime session options.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.config.model = self.config.model.ort_session(config);
        self
    }

    /// Sets the resize policy applied before the center crop.
    pub fn resize_policy(mut self, policy: ResizePolicy) -> Self {
        self.config.resize_policy = policy;
        self
    }

    /// Sets how raw model scores become probabilities.
    pub fn activation(mut self, activation: ScoreActivation) -> Self {
        self.config.activation = activation;
        self
    }

    /// Sets the number of top predictions to rank.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Sets the minimum probability for a prediction to be reported.
    pub fn confidence_threshold(mut self, threshold: f32) -> Self {
        self.config.confidence_threshold = threshold;
        self
    }

    /// Sets the path to a JSON label file (an array of strings).
    pub fn labels_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.labels_path = Some(path.into());
        self
    }

    /// Supplies an already-loaded label table, overriding `labels_path`.
    pub fn labels(mut self, labels: LabelTable) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Builds the classifier, loading the label table and model session.
    pub fn build(self) -> ClassifyResult<ImageClassifier<OrtInfer>> {
        let labels = match (self.labels, &self.labels_path) {
            (Some(labels), _) => labels,
            (None, Some(path)) => LabelTable::from_json_file(path)?,
            (None, None) => {
                return Err(ClassifyError::config_error(
                    "either labels or labels_path must be provided",
                ))
            }
        };
        ImageClassifier::new(self.config, labels)
    }
}

impl Default for ImageClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tensor::{Tensor2D, Tensor4D};
    use image::{DynamicImage, Rgb, RgbImage};
    use std::io::Cursor;

    /// Stub backend returning a fixed score row for every input.
    #[derive(Debug)]
    struct StubModel {
        scores: Vec<f32>,
    }

    impl ScoreModel for StubModel {
        fn infer(&self, _input: &Tensor4D) -> ClassifyResult<Tensor2D> {
            Ok(Tensor2D::from_shape_vec((1, self.scores.len()), self.scores.clone()).unwrap())
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn stub_classifier(
        scores: Vec<f32>,
        labels: LabelTable,
        threshold: f32,
    ) -> ImageClassifier<StubModel> {
        let predictor = Predictor::new(
            StubModel { scores },
            Arc::new(labels),
            ScoreActivation::Softmax,
            5,
            threshold,
        );
        ImageClassifier::from_parts(Preprocessor::imagenet().unwrap(), predictor)
    }

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img.clone())
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn thousand_class_table() -> LabelTable {
        LabelTable::new((0..1000).map(|i| {
            if i == 0 {
                "test-object".to_string()
            } else {
                format!("class-{}", i)
            }
        }))
    }

    #[test]
    fn test_dominant_class_end_to_end() {
        // One strong logit against 999 weak ones: only the dominant class
        // clears a 0.05 threshold.
        let mut scores = vec![1.0f32; 1000];
        scores[0] = 10.0;
        let classifier = stub_classifier(scores, thousand_class_table(), 0.05);

        let img = RgbImage::from_pixel(300, 300, Rgb([90, 120, 200]));
        let result = classifier.classify(&png_bytes(&img)).unwrap();

        assert_eq!(result.count, 1);
        assert_eq!(result.predictions.len(), 1);
        assert_eq!(result.predictions[0].label, "test-object");
        assert!(result.predictions[0].confidence > 0.05);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let mut scores = vec![0.5f32; 1000];
        scores[3] = 4.0;
        scores[7] = 3.0;
        let classifier = stub_classifier(scores, thousand_class_table(), 0.01);

        let bytes = png_bytes(&RgbImage::from_pixel(64, 48, Rgb([1, 2, 3])));
        let first = classifier.classify(&bytes).unwrap();
        let second = classifier.classify(&bytes).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_corrupt_bytes_yield_decode_error() {
        let classifier = stub_classifier(vec![1.0; 10], LabelTable::new(["a"; 10]), 0.05);
        let err = classifier.classify(b"\x89PNG but actually garbage").unwrap_err();
        assert!(matches!(err, ClassifyError::Decode(_)));
    }

    #[test]
    fn test_threshold_override_per_request() {
        let mut scores = vec![1.0f32; 4];
        scores[2] = 3.0;
        let classifier = stub_classifier(
            scores,
            LabelTable::new(["a", "b", "c", "d"]),
            0.05,
        );
        let bytes = png_bytes(&RgbImage::new(32, 32));

        let strict = classifier.classify_with_threshold(&bytes, 1.0).unwrap();
        assert!(strict.predictions.is_empty());

        let lax = classifier.classify_with_threshold(&bytes, 0.0).unwrap();
        assert_eq!(lax.predictions.len(), 4);
    }

    #[test]
    fn test_batch_matches_single() {
        let mut scores = vec![0.0f32; 16];
        scores[5] = 2.0;
        let classifier = stub_classifier(
            scores,
            LabelTable::new((0..16).map(|i| format!("c{}", i))),
            0.01,
        );

        let items: Vec<Vec<u8>> = (0..12)
            .map(|i| png_bytes(&RgbImage::from_pixel(40 + i, 40, Rgb([i as u8, 0, 0]))))
            .collect();
        let batch = classifier.classify_batch(&items);

        assert_eq!(batch.len(), items.len());
        for (bytes, result) in items.iter().zip(&batch) {
            let single = classifier.classify(bytes).unwrap();
            assert_eq!(result.as_ref().unwrap(), &single);
        }
    }

    #[test]
    fn test_builder_requires_labels() {
        let err = ImageClassifier::builder()
            .model_path("model.onnx")
            .build()
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Config { .. }));
    }
}

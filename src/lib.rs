//! # percept
//!
//! An image-classification inference library with a small HTTP serving
//! layer, backed by ONNX Runtime.
//!
//! ## Features
//!
//! - Deterministic ImageNet-style preprocessing (bilinear resize,
//!   center crop, per-channel normalization into a channel-first tensor)
//! - Pluggable model backends behind a single `ScoreModel` capability
//! - Numerically stable softmax, deterministic top-k ranking, and
//!   configurable confidence thresholding
//! - A pooled ONNX Runtime session backend safe for concurrent requests
//! - An axum router exposing `POST /predict` and `GET /health`
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, tensors, the model trait, labels
//! * [`processors`] - Resize, crop, normalization, softmax, top-k operators
//! * [`pipeline`] - The request pipeline and the `ImageClassifier` facade
//! * [`serving`] - HTTP routes, error mapping, and model bootstrap
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use percept::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = ImageClassifier::builder()
//!     .model_path("models/mobilenetv2.onnx")
//!     .labels_path("models/imagenet_classes.json")
//!     .confidence_threshold(0.05)
//!     .build()?;
//!
//! let bytes = std::fs::read("photo.jpg")?;
//! let result = classifier.classify(&bytes)?;
//! for p in &result.predictions {
//!     println!("{}: {:.1}%", p.label, p.confidence * 100.0);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod pipeline;
pub mod processors;
pub mod serving;

/// Prelude module for convenient imports.
///
/// Brings the essentials into scope with a single use statement:
///
/// ```rust
/// use percept::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{
        ClassifierConfig, ClassifyError, ClassifyResult, LabelTable, OrtInfer, ScoreActivation,
        ScoreModel,
    };
    pub use crate::pipeline::{
        Classification, ImageClassifier, ImageClassifierBuilder, Prediction,
    };
    pub use crate::processors::ResizePolicy;
}

//! The core module of the classification pipeline.
//!
//! This module contains the fundamental components shared by the pipeline:
//! - Error handling
//! - Configuration management and validation
//! - Tensor type aliases
//! - The model invocation trait and its ONNX Runtime implementation
//! - The class-index to label mapping
//!
//! It also re-exports the commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod inference;
pub mod labels;
pub mod tensor;

pub use config::{
    ClassifierConfig, ConfigError, ConfigValidator, ModelConfig, OrtSessionConfig,
    ScoreActivation, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_CROP_SIZE, DEFAULT_RESIZE_TARGET,
    DEFAULT_TOP_K, IMAGENET_MEAN, IMAGENET_STD,
};
pub use errors::{ClassifyError, ClassifyResult, ProcessingStage};
pub use inference::{OrtInfer, ScoreModel};
pub use labels::LabelTable;
pub use tensor::{Tensor2D, Tensor4D};

/// Initializes the tracing subscriber for logging.
///
/// Sets up the tracing subscriber with an environment filter and a
/// formatting layer. Typically called once at the start of an application.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

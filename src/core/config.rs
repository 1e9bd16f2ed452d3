//! Configuration utilities for the classification pipeline.
//!
//! This module provides the configuration error type, a validation trait with
//! shared helpers, and the configuration structures consumed when building a
//! classifier: model/session settings, preprocessing settings, and
//! postprocessing settings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::processors::ResizePolicy;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a model path does not exist.
    #[error("model path does not exist: {path}")]
    ModelPathNotFound {
        /// The missing path.
        path: std::path::PathBuf,
    },

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// Error indicating that a resource limit has been exceeded.
    #[error("resource limit exceeded: {message}")]
    ResourceLimitExceeded {
        /// Description of the exceeded limit.
        message: String,
    },
}

/// A trait for validating configuration parameters.
///
/// Provides shared helpers for the checks that recur across configuration
/// structs: positive counts, value ranges, existing model paths, and sane
/// image dimensions.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Validates that a usize value is positive.
    fn validate_positive_usize(&self, value: usize, field_name: &str) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidConfig {
                message: format!("{} must be greater than 0", field_name),
            });
        }
        Ok(())
    }

    /// Validates that an f32 value lies within `[min, max]`.
    fn validate_f32_range(
        &self,
        value: f32,
        min: f32,
        max: f32,
        field_name: &str,
    ) -> Result<(), ConfigError> {
        if !value.is_finite() || value < min || value > max {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "{} must be between {} and {}, got {}",
                    field_name, min, max, value
                ),
            });
        }
        Ok(())
    }

    /// Validates that a model path exists and is a file.
    fn validate_model_path(&self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ModelPathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "model path must be a file, not a directory: {}",
                    path.display()
                ),
            });
        }
        Ok(())
    }

    /// Validates image dimensions against a hard upper bound.
    fn validate_image_dimensions(
        &self,
        width: u32,
        height: u32,
        field_name: &str,
    ) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "{} dimensions must be greater than 0, got {}x{}",
                    field_name, width, height
                ),
            });
        }

        const MAX_DIMENSION: u32 = 8192;
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ConfigError::ResourceLimitExceeded {
                message: format!(
                    "{} dimensions {}x{} exceed maximum allowed size {}x{}",
                    field_name, width, height, MAX_DIMENSION, MAX_DIMENSION
                ),
            });
        }

        Ok(())
    }
}

impl From<ConfigError> for String {
    fn from(error: ConfigError) -> Self {
        error.to_string()
    }
}

/// ONNX Runtime session options applied when building the session pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes.
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes.
    pub inter_threads: Option<usize>,
    /// Whether to enable parallel graph execution.
    pub parallel_execution: Option<bool>,
    /// Graph optimization level (0 disables, 3 is the most aggressive).
    pub optimization_level: Option<u8>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with no options set.
    pub fn new() -> Self {
        Self::default()
    }
}

/// How raw model scores are converted to probabilities.
///
/// Graph-runtime backends emit unnormalized logits and need `Softmax`;
/// pipeline-style backends already emit probabilities and use `Identity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoreActivation {
    /// Apply a numerically stable softmax to the raw scores.
    #[default]
    Softmax,
    /// Scores are already probabilities; pass them through.
    Identity,
}

/// Configuration for the model backend shared by classifier builders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// The path to the ONNX model file (optional until build time).
    pub model_path: Option<std::path::PathBuf>,
    /// The name of the model used in logs and error context (optional).
    pub model_name: Option<String>,
    /// The name of the model input tensor; auto-detected when absent.
    pub input_name: Option<String>,
    /// Number of pooled sessions for concurrent predictions (minimum 1).
    pub session_pool_size: Option<usize>,
    /// ONNX Runtime session options.
    pub ort_session: Option<OrtSessionConfig>,
}

impl ModelConfig {
    /// Creates a new ModelConfig with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model path.
    pub fn model_path(mut self, model_path: impl Into<std::path::PathBuf>) -> Self {
        self.model_path = Some(model_path.into());
        self
    }

    /// Sets the model name.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    /// Sets the input tensor name.
    pub fn input_name(mut self, input_name: impl Into<String>) -> Self {
        self.input_name = Some(input_name.into());
        self
    }

    /// Sets the session pool size.
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = Some(size);
        self
    }

    /// Sets the ONNX Runtime session options.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.ort_session = Some(config);
        self
    }
}

impl ConfigValidator for ModelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pool_size) = self.session_pool_size {
            self.validate_positive_usize(pool_size, "session_pool_size")?;
        }
        if let Some(model_path) = &self.model_path {
            self.validate_model_path(model_path)?;
        }
        if let Some(ort) = &self.ort_session {
            if let Some(level) = ort.optimization_level {
                if level > 3 {
                    return Err(ConfigError::InvalidConfig {
                        message: format!(
                            "optimization_level must be between 0 and 3, got {}",
                            level
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Configuration for the full classifier: model, preprocessing, and
/// postprocessing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Model backend configuration.
    pub model: ModelConfig,
    /// Resize policy applied before the center crop.
    pub resize_policy: ResizePolicy,
    /// Side length of the square center crop.
    pub crop_size: u32,
    /// Per-channel means for normalization (RGB order).
    pub mean: [f32; 3],
    /// Per-channel standard deviations for normalization (RGB order).
    pub std: [f32; 3],
    /// How raw scores become probabilities.
    pub activation: ScoreActivation,
    /// Number of top predictions to rank.
    pub top_k: usize,
    /// Minimum probability for a prediction to be reported.
    pub confidence_threshold: f32,
}

/// ImageNet channel means used by the pretrained classification models.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet channel standard deviations paired with [`IMAGENET_MEAN`].
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Default minimum probability for a prediction to be reported.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.05;
/// Default number of ranked predictions.
pub const DEFAULT_TOP_K: usize = 5;
/// Shorter-side target of the default resize policy.
pub const DEFAULT_RESIZE_TARGET: u32 = 256;
/// Side length of the default center crop.
pub const DEFAULT_CROP_SIZE: u32 = 224;

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::new(),
            resize_policy: ResizePolicy::ShorterSide(DEFAULT_RESIZE_TARGET),
            crop_size: DEFAULT_CROP_SIZE,
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
            activation: ScoreActivation::Softmax,
            top_k: DEFAULT_TOP_K,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl ClassifierConfig {
    /// Creates a new ClassifierConfig with the ImageNet defaults.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigValidator for ClassifierConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.validate_positive_usize(self.top_k, "top_k")?;
        self.validate_f32_range(
            self.confidence_threshold,
            0.0,
            1.0,
            "confidence_threshold",
        )?;
        self.validate_image_dimensions(self.crop_size, self.crop_size, "crop_size")?;

        let resize_min = match self.resize_policy {
            ResizePolicy::ShorterSide(target) => target,
            ResizePolicy::Exact(w, h) => w.min(h),
        };
        if resize_min < self.crop_size {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "resize target {} is smaller than crop size {}",
                    resize_min, self.crop_size
                ),
            });
        }

        for (i, &s) in self.std.iter().enumerate() {
            if s <= 0.0 {
                return Err(ConfigError::InvalidConfig {
                    message: format!(
                        "std at index {} must be greater than 0, got {}",
                        i, s
                    ),
                });
            }
        }

        Ok(())
    }
}

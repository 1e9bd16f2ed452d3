//! Model invocation for the classification pipeline.
//!
//! The pipeline depends on a single capability: turning an input tensor into
//! a per-class score matrix. [`ScoreModel`] expresses that capability as a
//! trait so different backends (the ONNX Runtime engine here, stubs in
//! tests) are interchangeable. [`OrtInfer`] is the production backend: it
//! owns a pool of ONNX Runtime sessions guarded by mutexes and selected
//! round-robin, so concurrent requests never share a session handle —
//! the pipeline does not rely on the runtime being reentrant.

use crate::core::config::{ModelConfig, OrtSessionConfig};
use crate::core::errors::{ClassifyError, ClassifyResult, SimpleError};
use crate::core::tensor::{Tensor2D, Tensor4D};
use ort::{
    session::{builder::SessionBuilder, Session},
    value::TensorRef,
};
use std::fmt::Debug;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Capability of producing one score row per input batch element.
///
/// Implementations must be safe to call concurrently; any required
/// serialization of the underlying runtime handle is the implementation's
/// responsibility.
pub trait ScoreModel: Send + Sync + Debug {
    /// Runs the model on a `(batch, 3, H, W)` input and returns the
    /// `(batch, classes)` score matrix.
    fn infer(&self, input: &Tensor4D) -> ClassifyResult<Tensor2D>;

    /// Human-readable backend description for logs and health reporting.
    fn model_name(&self) -> &str;
}

/// ONNX Runtime backed [`ScoreModel`].
#[derive(Debug)]
pub struct OrtInfer {
    /// Pool of sessions for concurrent predictions.
    sessions: Vec<Mutex<Session>>,
    /// Next index for round-robin session selection.
    next_idx: AtomicUsize,
    /// The name of the input tensor.
    input_name: String,
    /// The path to the model file for error context.
    model_path: std::path::PathBuf,
    /// The model name for error context.
    model_name: String,
}

/// Input tensor names probed when none is configured.
const COMMON_INPUT_NAMES: [&str; 5] = ["input", "x", "images", "data", "image"];

impl OrtInfer {
    /// Creates an OrtInfer with default session settings and a single
    /// pooled session.
    pub fn new(model_path: impl AsRef<Path>) -> ClassifyResult<Self> {
        Self::from_config(&ModelConfig::new().model_path(model_path.as_ref()))
    }

    /// Creates an OrtInfer from a [`ModelConfig`], building the configured
    /// session pool and resolving the input tensor name.
    ///
    /// When no input name is configured it is auto-detected by probing the
    /// model's declared inputs against a list of common names, falling back
    /// to the model's first input.
    pub fn from_config(config: &ModelConfig) -> ClassifyResult<Self> {
        let path = config.model_path.as_deref().ok_or_else(|| {
            ClassifyError::config_error("model_path is required to build an ONNX session")
        })?;
        let pool_size = config.session_pool_size.unwrap_or(1).max(1);

        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            sessions.push(Mutex::new(Self::build_session(
                path,
                config.ort_session.as_ref(),
            )?));
        }

        let input_name = match &config.input_name {
            Some(name) => name.clone(),
            None => {
                let session = sessions[0].lock().map_err(|_| {
                    ClassifyError::config_error("session lock poisoned during input detection")
                })?;
                let available: Vec<String> =
                    session.inputs.iter().map(|i| i.name.clone()).collect();
                COMMON_INPUT_NAMES
                    .iter()
                    .find(|&name| available.iter().any(|i| i == *name))
                    .map(|s| s.to_string())
                    .or_else(|| available.first().cloned())
                    .ok_or_else(|| {
                        ClassifyError::model_load_error(
                            path,
                            "model declares no inputs",
                            Some("verify the model file is a valid classification model"),
                            None::<std::io::Error>,
                        )
                    })?
            }
        };

        let model_name = config
            .model_name
            .clone()
            .or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "unknown_model".to_string());

        Ok(OrtInfer {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_name,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    fn build_session(
        path: &Path,
        config: Option<&OrtSessionConfig>,
    ) -> ClassifyResult<Session> {
        let mut builder = Session::builder()?;
        if let Some(cfg) = config {
            builder = Self::apply_session_config(builder, cfg)?;
        }
        builder.commit_from_file(path).map_err(|e| {
            ClassifyError::model_load_error(
                path,
                "failed to create ONNX session",
                Some("verify the model path and file integrity"),
                Some(e),
            )
        })
    }

    fn apply_session_config(
        mut builder: SessionBuilder,
        cfg: &OrtSessionConfig,
    ) -> Result<SessionBuilder, ort::Error> {
        use ort::session::builder::GraphOptimizationLevel;

        if let Some(intra) = cfg.intra_threads {
            builder = builder.with_intra_threads(intra)?;
        }
        if let Some(inter) = cfg.inter_threads {
            builder = builder.with_inter_threads(inter)?;
        }
        if let Some(par) = cfg.parallel_execution {
            builder = builder.with_parallel_execution(par)?;
        }
        if let Some(level) = cfg.optimization_level {
            let mapped = match level {
                0 => GraphOptimizationLevel::Disable,
                1 => GraphOptimizationLevel::Level1,
                2 => GraphOptimizationLevel::Level2,
                _ => GraphOptimizationLevel::Level3,
            };
            builder = builder.with_optimization_level(mapped)?;
        }
        Ok(builder)
    }

    /// Gets the path to the model file.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Runs a forward pass and extracts the `(batch, classes)` score matrix.
    fn run_scores(&self, x: &Tensor4D) -> ClassifyResult<Tensor2D> {
        let input_shape = x.shape().to_vec();
        let batch_size = input_shape[0];

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            ClassifyError::inference_error(
                &self.model_name,
                &format!(
                    "failed to convert input tensor with shape {:?}",
                    input_shape
                ),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        // Round-robin select a session; the mutex serializes access to it.
        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session = self.sessions[idx].lock().map_err(|_| {
            ClassifyError::inference_error(
                &self.model_name,
                &format!(
                    "failed to acquire session lock for session {}/{}",
                    idx,
                    self.sessions.len()
                ),
                SimpleError::new("session lock poisoned"),
            )
        })?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                ClassifyError::inference_error(
                    &self.model_name,
                    "model declares no outputs",
                    SimpleError::new("empty output list"),
                )
            })?;

        let outputs = session.run(inputs).map_err(|e| {
            ClassifyError::inference_error(
                &self.model_name,
                &format!(
                    "forward pass failed with input '{}' -> output '{}'",
                    self.input_name, output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ClassifyError::inference_error(
                    &self.model_name,
                    &format!("failed to extract output tensor '{}' as f32", output_name),
                    e,
                )
            })?;

        if output_shape.len() != 2 {
            return Err(ClassifyError::tensor_operation(
                &format!(
                    "model '{}': expected 2D score output, got {}D with shape {:?}",
                    self.model_name,
                    output_shape.len(),
                    output_shape
                ),
                SimpleError::new("invalid output tensor rank"),
            ));
        }

        let num_classes = output_shape[1] as usize;
        if output_data.len() != batch_size * num_classes {
            return Err(ClassifyError::tensor_operation(
                &format!(
                    "model '{}': output data size {} does not match shape {:?}",
                    self.model_name,
                    output_data.len(),
                    output_shape
                ),
                SimpleError::new("output tensor data size mismatch"),
            ));
        }

        let view = ndarray::ArrayView2::from_shape((batch_size, num_classes), output_data)
            .map_err(ClassifyError::Tensor)?;
        Ok(view.to_owned())
    }
}

impl ScoreModel for OrtInfer {
    fn infer(&self, input: &Tensor4D) -> ClassifyResult<Tensor2D> {
        self.run_scores(input)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

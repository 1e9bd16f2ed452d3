//! Tensor type aliases used across the pipeline.
//!
//! The model contract is fixed: a `(1, 3, H, W)` float32 input in
//! channel-first layout and a `(1, N)` float32 score matrix out.

/// A 2D tensor of 32-bit floats: `(batch, classes)` score output.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4D tensor of 32-bit floats: `(batch, channels, height, width)` input.
pub type Tensor4D = ndarray::Array4<f32>;

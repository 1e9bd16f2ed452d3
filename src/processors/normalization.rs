//! Image normalization into the model input tensor.
//!
//! Converts an RGB image to a `(1, 3, H, W)` float32 tensor in channel-first
//! layout, scaling pixels to `[0, 1]` and applying per-channel mean/std
//! normalization in a single fused multiply-add per pixel.

use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::core::tensor::Tensor4D;
use image::RgbImage;

/// Normalizes images for model input.
///
/// The per-channel scaling factors are precomputed from the configuration:
/// `alpha = scale / std` and `beta = -mean / std`, so each pixel channel is
/// transformed as `value * alpha[c] + beta[c]`.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std).
    alpha: [f32; 3],
    /// Offset values for each channel (beta = -mean / std).
    beta: [f32; 3],
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance.
    ///
    /// # Arguments
    ///
    /// * `scale` - Multiplier applied to raw pixel values before the
    ///   mean/std normalization (1/255 maps 8-bit pixels into `[0, 1]`).
    /// * `mean` - Per-channel means in RGB order.
    /// * `std` - Per-channel standard deviations in RGB order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the scale is not positive or any
    /// standard deviation is not positive.
    pub fn new(scale: f32, mean: [f32; 3], std: [f32; 3]) -> ClassifyResult<Self> {
        if scale <= 0.0 {
            return Err(ClassifyError::config_error(
                "scale must be greater than 0",
            ));
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(ClassifyError::config_error(format!(
                    "standard deviation at index {} must be greater than 0, got {}",
                    i, s
                )));
            }
        }

        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            alpha[c] = scale / std[c];
            beta[c] = -mean[c] / std[c];
        }

        Ok(Self { alpha, beta })
    }

    /// Creates a normalizer with the ImageNet mean/std and 1/255 scaling.
    pub fn imagenet() -> ClassifyResult<Self> {
        Self::new(
            1.0 / 255.0,
            crate::core::config::IMAGENET_MEAN,
            crate::core::config::IMAGENET_STD,
        )
    }

    /// Normalizes a single image into a `(1, 3, height, width)` tensor.
    pub fn normalize_to(&self, img: &RgbImage) -> ClassifyResult<Tensor4D> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ClassifyError::invalid_input(format!(
                "cannot normalize empty image ({}x{})",
                width, height
            )));
        }
        let (w, h) = (width as usize, height as usize);
        let mut result = vec![0.0f32; 3 * h * w];

        for (c, plane) in result.chunks_exact_mut(h * w).enumerate() {
            for y in 0..h {
                for x in 0..w {
                    let pixel = img.get_pixel(x as u32, y as u32);
                    plane[y * w + x] = pixel[c] as f32 * self.alpha[c] + self.beta[c];
                }
            }
        }

        let len = result.len();
        ndarray::Array4::from_shape_vec((1, 3, h, w), result).map_err(|e| {
            ClassifyError::normalization(
                &format!(
                    "failed to shape tensor (1, 3, {}, {}) from {} values",
                    h, w, len
                ),
                e,
            )
        })
    }
}

//! Image resizing ahead of the center crop.
//!
//! Two policies are supported. [`ResizePolicy::ShorterSide`] preserves the
//! aspect ratio and scales the shorter side to the target (the convention
//! pretrained ImageNet models were evaluated with). [`ResizePolicy::Exact`]
//! resizes anisotropically to a fixed square. Both use bilinear
//! interpolation, which the pretrained models' preprocessing contract
//! requires. The two policies produce different tensors for non-square
//! inputs and must not be mixed within one deployment.

use crate::core::errors::{ClassifyError, ClassifyResult};
use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

/// How an input image is scaled before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizePolicy {
    /// Aspect-preserving resize so the shorter side equals the target.
    ShorterSide(u32),
    /// Anisotropic resize to exactly `(width, height)`.
    Exact(u32, u32),
}

/// A bilinear resize operator with a fixed policy.
#[derive(Debug, Clone)]
pub struct Resize {
    policy: ResizePolicy,
}

impl Resize {
    /// Creates a resize operator for the given policy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any target dimension is zero.
    pub fn new(policy: ResizePolicy) -> ClassifyResult<Self> {
        let valid = match policy {
            ResizePolicy::ShorterSide(target) => target > 0,
            ResizePolicy::Exact(w, h) => w > 0 && h > 0,
        };
        if !valid {
            return Err(ClassifyError::config_error(
                "resize target dimensions must be greater than 0",
            ));
        }
        Ok(Self { policy })
    }

    /// The configured policy.
    pub fn policy(&self) -> ResizePolicy {
        self.policy
    }

    /// Computes the output dimensions for an input of `(width, height)`.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        match self.policy {
            ResizePolicy::Exact(w, h) => (w, h),
            ResizePolicy::ShorterSide(target) => {
                if width <= height {
                    let scaled =
                        (height as f64 * target as f64 / width as f64).round() as u32;
                    (target, scaled.max(target))
                } else {
                    let scaled =
                        (width as f64 * target as f64 / height as f64).round() as u32;
                    (scaled.max(target), target)
                }
            }
        }
    }

    /// Resizes an image with bilinear interpolation according to the policy.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for images with a zero dimension.
    pub fn apply(&self, img: &RgbImage) -> ClassifyResult<RgbImage> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ClassifyError::invalid_input(format!(
                "cannot resize empty image ({}x{})",
                width, height
            )));
        }

        let (target_w, target_h) = self.target_dimensions(width, height);
        if (target_w, target_h) == (width, height) {
            return Ok(img.clone());
        }

        Ok(imageops::resize(
            img,
            target_w,
            target_h,
            imageops::FilterType::Triangle,
        ))
    }
}

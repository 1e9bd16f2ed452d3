//! Decoding and preprocessing of request images.
//!
//! [`decode_image`] turns raw request bytes into an RGB image, forcing any
//! alpha or palette channels down to 3-channel RGB. [`Preprocessor`] then
//! applies the deterministic resize → center-crop → normalize transform that
//! produces the model input tensor. Both are pure functions of their input.

use crate::core::config::ClassifierConfig;
use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::core::tensor::Tensor4D;
use crate::processors::{CenterCrop, NormalizeImage, Resize, ResizePolicy};
use image::{DynamicImage, RgbImage};

/// Decodes image bytes and converts the result to 3-channel RGB.
///
/// # Errors
///
/// Returns [`ClassifyError::Decode`] if the bytes are not a decodable image
/// and [`ClassifyError::UnsupportedColorMode`] if the decoded color layout
/// cannot be converted to RGB.
pub fn decode_image(bytes: &[u8]) -> ClassifyResult<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(ClassifyError::Decode)?;
    to_rgb(img)
}

/// Forces a decoded image into 3-channel RGB.
///
/// Alpha channels are dropped and palette/grayscale layouts expanded; no
/// extra channel ever reaches normalization. Color layouts this crate does
/// not know how to convert are rejected.
fn to_rgb(img: DynamicImage) -> ClassifyResult<RgbImage> {
    use image::ColorType::*;
    match img.color() {
        L8 | La8 | Rgb8 | Rgba8 | L16 | La16 | Rgb16 | Rgba16 | Rgb32F | Rgba32F => {
            Ok(img.to_rgb8())
        }
        other => Err(ClassifyError::UnsupportedColorMode {
            details: format!("{:?}", other),
        }),
    }
}

/// Deterministic transform from an RGB image to the model input tensor.
///
/// Applies the configured resize policy with bilinear interpolation, crops
/// the center square, scales pixels to `[0, 1]`, normalizes per channel,
/// and emits a `(1, 3, crop, crop)` channel-first float32 tensor.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    resize: Resize,
    crop: CenterCrop,
    normalize: NormalizeImage,
}

impl Preprocessor {
    /// Creates a preprocessor from explicit parameters.
    pub fn new(
        policy: ResizePolicy,
        crop_size: u32,
        mean: [f32; 3],
        std: [f32; 3],
    ) -> ClassifyResult<Self> {
        Ok(Self {
            resize: Resize::new(policy)?,
            crop: CenterCrop::new(crop_size)?,
            normalize: NormalizeImage::new(1.0 / 255.0, mean, std)?,
        })
    }

    /// Creates a preprocessor from a classifier configuration.
    pub fn from_config(config: &ClassifierConfig) -> ClassifyResult<Self> {
        Self::new(
            config.resize_policy,
            config.crop_size,
            config.mean,
            config.std,
        )
    }

    /// Creates a preprocessor with the ImageNet defaults.
    pub fn imagenet() -> ClassifyResult<Self> {
        Self::from_config(&ClassifierConfig::default())
    }

    /// Transforms an RGB image into the model input tensor.
    ///
    /// The output shape is always `(1, 3, crop, crop)` regardless of the
    /// input dimensions.
    pub fn transform(&self, img: &RgbImage) -> ClassifyResult<Tensor4D> {
        let resized = self.resize.apply(img)?;
        let cropped = self.crop.apply(&resized)?;
        self.normalize.normalize_to(&cropped)
    }

    /// Decodes bytes and transforms the result in one step.
    pub fn transform_bytes(&self, bytes: &[u8]) -> ClassifyResult<Tensor4D> {
        let img = decode_image(bytes)?;
        self.transform(&img)
    }
}

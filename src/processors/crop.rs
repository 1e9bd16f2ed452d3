//! Center cropping to the model input size.

use crate::core::errors::{ClassifyError, ClassifyResult};
use image::{imageops, RgbImage};

/// A processor that crops a square region from the center of an image.
///
/// Crop offsets use integer floor division, matching the preprocessing the
/// pretrained models were trained with.
#[derive(Debug, Clone)]
pub struct CenterCrop {
    size: u32,
}

impl CenterCrop {
    /// Creates a center-crop operator with the given square side length.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `size` is zero.
    pub fn new(size: u32) -> ClassifyResult<Self> {
        if size == 0 {
            return Err(ClassifyError::config_error(
                "crop size must be greater than 0",
            ));
        }
        Ok(Self { size })
    }

    /// The configured crop side length.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Crops the center `size`×`size` region out of an image.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if the image is smaller than the crop
    /// in either dimension.
    pub fn apply(&self, img: &RgbImage) -> ClassifyResult<RgbImage> {
        let (width, height) = img.dimensions();
        if width < self.size || height < self.size {
            return Err(ClassifyError::invalid_input(format!(
                "image {}x{} is smaller than crop size {}",
                width, height, self.size
            )));
        }

        if width == self.size && height == self.size {
            return Ok(img.clone());
        }

        let x = (width - self.size) / 2;
        let y = (height - self.size) / 2;
        Ok(imageops::crop_imm(img, x, y, self.size, self.size).to_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_crop_dimensions() {
        let crop = CenterCrop::new(224).unwrap();
        let img = RgbImage::new(256, 256);
        let out = crop.apply(&img).unwrap();
        assert_eq!(out.dimensions(), (224, 224));
    }

    #[test]
    fn test_crop_offsets_floor() {
        // 225x225 -> offset (225-224)/2 = 0, so pixel (0,0) survives.
        let mut img = RgbImage::new(225, 225);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));

        let crop = CenterCrop::new(224).unwrap();
        let out = crop.apply(&img).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_crop_is_centered() {
        // Mark the pixel at the crop origin (16, 16) of a 256x256 image.
        let mut img = RgbImage::new(256, 256);
        img.put_pixel(16, 16, Rgb([0, 255, 0]));

        let crop = CenterCrop::new(224).unwrap();
        let out = crop.apply(&img).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 255, 0]));
    }

    #[test]
    fn test_crop_exact_size_is_identity() {
        let img = RgbImage::from_pixel(224, 224, Rgb([1, 2, 3]));
        let crop = CenterCrop::new(224).unwrap();
        assert_eq!(crop.apply(&img).unwrap(), img);
    }

    #[test]
    fn test_crop_too_small_rejected() {
        let img = RgbImage::new(100, 300);
        let crop = CenterCrop::new(224).unwrap();
        assert!(crop.apply(&img).is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(CenterCrop::new(0).is_err());
    }
}

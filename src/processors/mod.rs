//! Image and score processing operators for the classification pipeline.
//!
//! # Modules
//!
//! * `resize` - Bilinear resizing under a configurable policy
//! * `crop` - Center cropping to the model input size
//! * `normalization` - Pixel scaling and mean/std normalization into a
//!   channel-first tensor
//! * `softmax` - Numerically stable score-to-probability conversion
//! * `topk` - Deterministic top-k ranking

mod crop;
mod normalization;
mod resize;
mod softmax;
mod topk;

pub use crop::CenterCrop;
pub use normalization::NormalizeImage;
pub use resize::{Resize, ResizePolicy};
pub use softmax::softmax;
pub use topk::top_k;

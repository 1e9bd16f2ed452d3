//! The classification request pipeline.
//!
//! Composed linearly per request: decode → [`Preprocessor`] →
//! [`Predictor`] → ranked [`Classification`]. The [`ImageClassifier`]
//! facade ties the stages together behind a single `classify` call.

mod classifier;
mod predictor;
mod preprocess;

pub use classifier::{ImageClassifier, ImageClassifierBuilder};
pub use predictor::{Classification, Prediction, Predictor};
pub use preprocess::{decode_image, Preprocessor};

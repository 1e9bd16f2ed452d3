//! HTTP serving layer around the classification pipeline.
//!
//! A thin axum surface: one prediction route, one health route, structured
//! JSON error responses, and a first-run model bootstrap. All pipeline
//! errors are converted to responses at this boundary.

mod error;
mod fetch;
mod router;
mod server;

pub use error::{ApiError, ErrorBody, ErrorDetail};
pub use fetch::ensure_model;
pub use router::{router, AppState};
pub use server::serve;

//! One-time model bootstrap.
//!
//! Downloads the model file on first run, before the server binds. Never
//! touched on the request path; a present file is left alone.

use std::path::Path;

use crate::core::errors::{ClassifyError, ClassifyResult};

/// Ensures the model file exists, downloading it from `url` if missing.
///
/// The download lands in a `.partial` sibling first and is renamed into
/// place, so a crashed download never leaves a truncated model behind.
pub async fn ensure_model(path: &Path, url: &str) -> ClassifyResult<()> {
    if path.exists() {
        tracing::debug!(path = %path.display(), "model file already present");
        return Ok(());
    }

    tracing::info!(url, path = %path.display(), "downloading model (first run)");

    let response = reqwest::get(url).await.map_err(|e| {
        ClassifyError::model_load_error(
            path,
            format!("model download failed: {}", e),
            Some("check the model URL and network connectivity"),
            Some(e),
        )
    })?;

    if !response.status().is_success() {
        return Err(ClassifyError::model_load_error(
            path,
            format!("model download returned HTTP {}", response.status()),
            Some("check the model URL"),
            None::<std::io::Error>,
        ));
    }

    let bytes = response.bytes().await.map_err(|e| {
        ClassifyError::model_load_error(
            path,
            format!("model download interrupted: {}", e),
            None,
            Some(e),
        )
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let partial = path.with_extension("partial");
    tokio::fs::write(&partial, &bytes).await?;
    tokio::fs::rename(&partial, path).await?;

    tracing::info!(
        path = %path.display(),
        size = bytes.len(),
        "model downloaded"
    );
    Ok(())
}

//! Classification server binary.
//!
//! Builds the classifier once at startup (downloading the model on first
//! run if a URL is given) and serves the prediction API.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use percept::core::{init_tracing, ScoreActivation};
use percept::pipeline::ImageClassifier;
use percept::processors::ResizePolicy;
use percept::serving::{ensure_model, serve, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Image classification HTTP service")]
struct Args {
    /// Path to the ONNX classification model
    #[arg(long, default_value = "models/mobilenetv2.onnx")]
    model: PathBuf,

    /// Path to the label file (JSON array of class names)
    #[arg(long, default_value = "models/imagenet_classes.json")]
    labels: PathBuf,

    /// URL to download the model from when the file is missing
    #[arg(long)]
    model_url: Option<String>,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Minimum confidence for a prediction to be reported
    #[arg(long, default_value_t = 0.05)]
    threshold: f32,

    /// Number of top predictions to rank
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    /// Number of pooled ONNX sessions for concurrent requests
    #[arg(long, default_value_t = 1)]
    session_pool: usize,

    /// Resize anisotropically to 256x256 instead of preserving aspect ratio
    #[arg(long)]
    exact_resize: bool,

    /// Model already outputs probabilities; skip the softmax
    #[arg(long)]
    probabilities: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    if let Some(url) = &args.model_url {
        ensure_model(&args.model, url).await?;
    }

    let resize_policy = if args.exact_resize {
        ResizePolicy::Exact(256, 256)
    } else {
        ResizePolicy::ShorterSide(256)
    };
    let activation = if args.probabilities {
        ScoreActivation::Identity
    } else {
        ScoreActivation::Softmax
    };

    let classifier = ImageClassifier::builder()
        .model_path(&args.model)
        .labels_path(&args.labels)
        .session_pool_size(args.session_pool)
        .resize_policy(resize_policy)
        .activation(activation)
        .top_k(args.top_k)
        .confidence_threshold(args.threshold)
        .build()?;

    let state = AppState::new(Arc::new(classifier));
    serve(SocketAddr::new(args.host, args.port), state).await?;
    Ok(())
}

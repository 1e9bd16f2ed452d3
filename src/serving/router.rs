//! HTTP routes for the classification service.
//!
//! `POST /predict` accepts a multipart upload with an `image` field and an
//! optional `threshold` query parameter; `GET /health` reports liveness and
//! the loaded model. Classification runs on the blocking thread pool so the
//! async runtime is never tied up by tensor math.

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::inference::{OrtInfer, ScoreModel};
use crate::pipeline::{Classification, ImageClassifier};
use crate::serving::error::ApiError;

/// Maximum accepted upload size in bytes (16 MB).
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared state handed to every handler.
pub struct AppState<M: ScoreModel = OrtInfer> {
    classifier: Arc<ImageClassifier<M>>,
}

impl<M: ScoreModel> AppState<M> {
    /// Wraps a built classifier for sharing across requests.
    pub fn new(classifier: Arc<ImageClassifier<M>>) -> Self {
        Self { classifier }
    }
}

impl<M: ScoreModel> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
        }
    }
}

/// Builds the service router.
pub fn router<M: ScoreModel + 'static>(state: AppState<M>) -> Router {
    Router::new()
        .route("/health", get(health::<M>))
        .route("/predict", post(predict::<M>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
}

async fn health<M: ScoreModel>(State(state): State<AppState<M>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model: state.classifier.model_name().to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct PredictQuery {
    threshold: Option<f32>,
}

async fn predict<M: ScoreModel + 'static>(
    State(state): State<AppState<M>>,
    Query(query): Query<PredictQuery>,
    mut multipart: Multipart,
) -> Result<Json<Classification>, ApiError> {
    let threshold = match query.threshold {
        Some(t) if !(0.0..=1.0).contains(&t) || !t.is_finite() => {
            return Err(ApiError::BadRequest(format!(
                "threshold must be between 0 and 1, got {}",
                t
            )));
        }
        Some(t) => Some(t),
        None => None,
    };

    let mut image_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read image field: {}", e)))?;
            image_bytes = Some(bytes);
            break;
        }
    }

    let Some(bytes) = image_bytes else {
        return Err(ApiError::BadRequest("no image file provided".to_string()));
    };

    let classifier = Arc::clone(&state.classifier);
    let result = tokio::task::spawn_blocking(move || match threshold {
        Some(t) => classifier.classify_with_threshold(&bytes, t),
        None => classifier.classify(&bytes),
    })
    .await
    .map_err(|e| ApiError::Internal(format!("classification task failed: {}", e)))?;

    Ok(Json(result?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ScoreActivation;
    use crate::core::errors::ClassifyResult;
    use crate::core::labels::LabelTable;
    use crate::core::tensor::{Tensor2D, Tensor4D};
    use crate::pipeline::{Predictor, Preprocessor};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[derive(Debug)]
    struct StubModel;

    impl ScoreModel for StubModel {
        fn infer(&self, _input: &Tensor4D) -> ClassifyResult<Tensor2D> {
            let mut scores = vec![0.0f32; 10];
            scores[4] = 8.0;
            Ok(Tensor2D::from_shape_vec((1, 10), scores).unwrap())
        }

        fn model_name(&self) -> &str {
            "stub-model"
        }
    }

    fn stub_state() -> AppState<StubModel> {
        let labels = LabelTable::new((0..10).map(|i| format!("label-{}", i)));
        let predictor = Predictor::new(
            StubModel,
            Arc::new(labels),
            ScoreActivation::Softmax,
            5,
            0.05,
        );
        let classifier =
            ImageClassifier::from_parts(Preprocessor::imagenet().unwrap(), predictor);
        AppState::new(Arc::new(classifier))
    }

    fn multipart_request(field_name: &str, payload: &[u8]) -> Request<Body> {
        let boundary = "test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"photo.png\"\r\n",
                field_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(64, 64, image::Rgb([10, 200, 30]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let app = router(stub_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model"], "stub-model");
    }

    #[tokio::test]
    async fn test_predict_returns_ranked_predictions() {
        let app = router(stub_state());
        let response = app
            .oneshot(multipart_request("image", &png_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["predictions"][0]["label"], "label-4");
    }

    #[tokio::test]
    async fn test_predict_without_image_field_is_bad_request() {
        let app = router(stub_state());
        let response = app
            .oneshot(multipart_request("document", b"some bytes"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_predict_with_corrupt_image_is_bad_request() {
        let app = router(stub_state());
        let response = app
            .oneshot(multipart_request("image", b"not an image"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_predict_rejects_out_of_range_threshold() {
        let app = router(stub_state());
        let mut request = multipart_request("image", &png_bytes());
        *request.uri_mut() = "/predict?threshold=1.5".parse().unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

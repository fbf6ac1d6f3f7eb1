use base64::{engine::general_purpose, Engine};
use std::path::Path;
use std::time::Duration;

use crate::error::{ClassificationError, ClassificationResult};
use crate::models::{ClassifyRequest, ClassifyResponse, HealthStatus, Prediction};

/// Trait for food classification backends
#[async_trait::async_trait]
pub trait ClassificationService: Send + Sync {
    async fn check_health(&self) -> ClassificationResult<HealthStatus>;
    async fn classify_food(&self, image_path: &Path) -> ClassificationResult<Vec<Prediction>>;
}

/// Read an image file and wrap it as a base64 data URL
pub fn image_to_data_url(image_path: &Path) -> ClassificationResult<String> {
    let image_data = std::fs::read(image_path)?;
    let base64_image = general_purpose::STANDARD.encode(&image_data);

    log::debug!("📊 Image file size: {} bytes", image_data.len());
    log::debug!("🔄 Base64 encoded size: {} bytes", base64_image.len());

    Ok(format!("data:{};base64,{}", mime_type_for(image_path), base64_image))
}

fn mime_type_for(image_path: &Path) -> &'static str {
    let extension = image_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Client for the remote `/health` + `/classify` backend
pub struct RemoteClassifier {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteClassifier {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ClassificationResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl ClassificationService for RemoteClassifier {
    async fn check_health(&self) -> ClassificationResult<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        log::debug!("🩺 Checking classifier health at {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            log::error!("❌ Health check failed: {}", e);
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ Health check error ({}): {}", status, body);
            return Err(ClassificationError::Http { status: status.as_u16(), body });
        }

        let response_text = response.text().await?;
        let health: HealthStatus = serde_json::from_str(&response_text)?;
        log::info!("🩺 Classifier health: model_loaded={}, classes={:?}", health.model_loaded, health.num_classes);

        Ok(health)
    }

    async fn classify_food(&self, image_path: &Path) -> ClassificationResult<Vec<Prediction>> {
        log::debug!("📸 Converting image to base64: {}", image_path.display());
        let request = ClassifyRequest {
            image: image_to_data_url(image_path)?,
        };

        let url = format!("{}/classify", self.base_url);
        log::info!("🤖 Sending image to classifier: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Classifier response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ Classifier HTTP error ({}): {}", status, body);
            return Err(ClassificationError::Http { status: status.as_u16(), body });
        }

        let response_text = response.text().await?;
        log::debug!("📄 Raw classifier response size: {} bytes", response_text.len());

        let data: ClassifyResponse = serde_json::from_str(&response_text)?;
        if !data.success {
            let message = data.error.unwrap_or_else(|| "Classification failed".to_string());
            log::error!("❌ Classification rejected: {} ({:?})", message, data.details);
            return Err(ClassificationError::Rejected(message));
        }

        let mut predictions = data.predictions;
        if predictions.is_empty() {
            predictions.extend(data.top_prediction);
        }
        if predictions.is_empty() {
            log::error!("❌ Classifier reported success without predictions");
            return Err(ClassificationError::Rejected("No predictions returned".to_string()));
        }

        log::info!("✅ Received {} predictions", predictions.len());
        for p in &predictions {
            log::debug!("   {} #{:?}: {:.3}", p.label, p.index, p.confidence);
        }
        Ok(predictions)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::io::Write;

    /// Serve `router` on an ephemeral port and return its base URL
    pub(crate) async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub(crate) fn temp_image(extension: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{}", extension))
            .tempfile()
            .unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();
        file
    }

    pub(crate) fn healthy_router(model_loaded: bool) -> Router {
        Router::new()
            .route(
                "/health",
                get(move || async move {
                    Json(json!({"status": "healthy", "model_loaded": model_loaded, "num_classes": 302}))
                }),
            )
            .route(
                "/classify",
                post(|Json(body): Json<Value>| async move {
                    let image = body["image"].as_str().unwrap_or_default();
                    if !image.starts_with("data:image/") {
                        return (StatusCode::BAD_REQUEST, Json(json!({"error": "No image data provided"})));
                    }
                    (
                        StatusCode::OK,
                        Json(json!({
                            "success": true,
                            "predictions": [
                                {"label": "grilled_salmon", "confidence": 0.8, "index": 50, "microplastics_count": 11},
                                {"label": "sushi", "confidence": 0.1, "index": 95}
                            ]
                        })),
                    )
                }),
            )
    }

    #[test]
    fn test_data_url_mime_types() {
        let png = temp_image("PNG");
        let url = image_to_data_url(png.path()).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let jpg = temp_image("jpg");
        let url = image_to_data_url(jpg.path()).unwrap();
        assert_eq!(url, "data:image/jpeg;base64,/9j/4AAQ");
    }

    #[test]
    fn test_missing_image_is_encoding_error() {
        let err = image_to_data_url(Path::new("/nonexistent/food.jpg")).unwrap_err();
        assert!(matches!(err, ClassificationError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_check_health() {
        let base_url = spawn_stub(healthy_router(true)).await;
        let classifier = RemoteClassifier::new(&format!("{}/", base_url));

        let health = classifier.check_health().await.unwrap();

        assert!(health.model_loaded);
        assert_eq!(health.num_classes, Some(302));
        assert_eq!(classifier.base_url(), base_url);
    }

    #[tokio::test]
    async fn test_classify_returns_ordered_predictions() {
        let base_url = spawn_stub(healthy_router(true)).await;
        let classifier = RemoteClassifier::new(&base_url);
        let image = temp_image("jpg");

        let predictions = classifier.classify_food(image.path()).await.unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].label, "grilled_salmon");
        assert_eq!(predictions[0].microplastics_count, Some(11));
        assert_eq!(predictions[1].microplastics_count, None);
    }

    #[tokio::test]
    async fn test_http_500_is_distinct_from_payload_failure() {
        let router = Router::new()
            .route(
                "/classify",
                post(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": "Classification failed", "details": "bad tensor"})),
                    )
                }),
            );
        let base_url = spawn_stub(router).await;
        let image = temp_image("jpg");

        let err = RemoteClassifier::new(&base_url)
            .classify_food(image.path())
            .await
            .unwrap_err();

        match err {
            ClassificationError::Http { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("bad tensor"));
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_payload_failure_carries_server_message() {
        let router = Router::new().route(
            "/classify",
            post(|| async { Json(json!({"success": false, "error": "Unsupported image"})) }),
        );
        let base_url = spawn_stub(router).await;
        let image = temp_image("png");

        let err = RemoteClassifier::new(&base_url)
            .classify_food(image.path())
            .await
            .unwrap_err();

        match err {
            ClassificationError::Rejected(message) => assert_eq!(message, "Unsupported image"),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_payload_failure_without_message() {
        let router = Router::new().route("/classify", post(|| async { Json(json!({"success": false})) }));
        let base_url = spawn_stub(router).await;
        let image = temp_image("jpg");

        let err = RemoteClassifier::new(&base_url)
            .classify_food(image.path())
            .await
            .unwrap_err();

        assert!(matches!(err, ClassificationError::Rejected(ref m) if m == "Classification failed"));
    }

    #[tokio::test]
    async fn test_top_prediction_fallback() {
        let router = Router::new().route(
            "/classify",
            post(|| async {
                Json(json!({
                    "success": true,
                    "top_prediction": {"label": "oysters", "confidence": 0.6, "index": 69}
                }))
            }),
        );
        let base_url = spawn_stub(router).await;
        let image = temp_image("jpg");

        let predictions = RemoteClassifier::new(&base_url).classify_food(image.path()).await.unwrap();

        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].index, Some(69));
    }

    #[tokio::test]
    async fn test_empty_predictions_are_rejected() {
        let router = Router::new().route(
            "/classify",
            post(|| async { Json(json!({"success": true, "predictions": []})) }),
        );
        let base_url = spawn_stub(router).await;
        let image = temp_image("jpg");

        let err = RemoteClassifier::new(&base_url)
            .classify_food(image.path())
            .await
            .unwrap_err();

        assert!(matches!(err, ClassificationError::Rejected(ref m) if m == "No predictions returned"));
    }

    #[tokio::test]
    async fn test_configured_timeout_applies() {
        let router = Router::new().route(
            "/health",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"status": "healthy", "model_loaded": true}))
            }),
        );
        let base_url = spawn_stub(router).await;
        let classifier = RemoteClassifier::with_timeout(&base_url, Duration::from_millis(200)).unwrap();

        let err = classifier.check_health().await.unwrap_err();

        match err {
            ClassificationError::Network(e) => assert!(e.is_timeout(), "expected timeout, got {}", e),
            other => panic!("expected network timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = RemoteClassifier::new(&format!("http://{}", addr))
            .check_health()
            .await
            .unwrap_err();

        assert!(matches!(err, ClassificationError::Network(_)));
    }
}

//! Router tests for the FoodLens HTTP surface
//!
//! The classifier is mocked so these tests cover routing, multipart handling,
//! error mapping, CORS and asset serving without a model on disk.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use foodlens_classifier::{ClassList, ImageClassifier};
use foodlens_core::{Error, Prediction, Result, ScoredLabel};
use foodlens_server::config::ServerConfig;
use foodlens_server::server::build_app;
use foodlens_server::state::AppState;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "foodlens-test-boundary";

/// What the mock classifier does when called
enum Behaviour {
    Predict(Prediction),
    RejectImage,
    Fail,
}

struct MockClassifier {
    classes: ClassList,
    behaviour: Behaviour,
    call_count: AtomicU32,
    last_upload_len: AtomicU32,
}

impl MockClassifier {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            classes: ClassList::food(),
            behaviour,
            call_count: AtomicU32::new(0),
            last_upload_len: AtomicU32::new(0),
        }
    }

    fn sushi() -> Self {
        Self::new(Behaviour::Predict(
            Prediction::new("sushi", 6, 0.91).with_top_k(vec![
                ScoredLabel {
                    label: "sushi".into(),
                    confidence: 0.91,
                },
                ScoredLabel {
                    label: "sashimi".into(),
                    confidence: 0.06,
                },
            ]),
        ))
    }
}

#[async_trait]
impl ImageClassifier for MockClassifier {
    async fn classify(&self, image: &[u8]) -> Result<Prediction> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.last_upload_len
            .store(image.len() as u32, Ordering::SeqCst);

        match &self.behaviour {
            Behaviour::Predict(prediction) => Ok(prediction.clone()),
            Behaviour::RejectImage => Err(Error::invalid_image("unsupported format")),
            Behaviour::Fail => Err(Error::classifier("forward pass failed")),
        }
    }

    fn name(&self) -> &str {
        "mock-food"
    }

    fn classes(&self) -> &ClassList {
        &self.classes
    }
}

fn app_with(classifier: Arc<MockClassifier>, config: ServerConfig) -> Router {
    build_app(AppState::new(classifier, config))
}

fn multipart_request(field: &str, payload: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"dish.jpg\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_root_serves_html() {
    let app = app_with(Arc::new(MockClassifier::sushi()), ServerConfig::default());

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    assert!(text_body(response).await.contains("upload-form"));
}

#[tokio::test]
async fn test_analyze_returns_label() {
    let classifier = Arc::new(MockClassifier::sushi());
    let app = app_with(classifier.clone(), ServerConfig::default());

    let response = app
        .oneshot(multipart_request("file", b"fake jpeg bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["result"], "sushi [6, 0.9100]");
    assert_eq!(body["label"], "sushi");
    assert_eq!(body["class_index"], 6);
    assert_eq!(body["top_k"][1]["label"], "sashimi");
    assert!(body["latency_us"].is_u64());

    let label = body["result"].as_str().unwrap();
    assert!(ClassList::food()
        .labels()
        .iter()
        .any(|known| label.starts_with(known.as_str())));

    assert_eq!(classifier.call_count.load(Ordering::SeqCst), 1);
    assert_eq!(
        classifier.last_upload_len.load(Ordering::SeqCst),
        b"fake jpeg bytes".len() as u32
    );
}

#[tokio::test]
async fn test_analyze_without_file_field() {
    let classifier = Arc::new(MockClassifier::sushi());
    let app = app_with(classifier.clone(), ServerConfig::default());

    let response = app
        .oneshot(multipart_request("image", b"fake jpeg bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert!(body["error"]["message"].as_str().unwrap().contains("'file'"));
    assert_eq!(classifier.call_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_analyze_empty_file() {
    let app = app_with(Arc::new(MockClassifier::sushi()), ServerConfig::default());

    let response = app.oneshot(multipart_request("file", b"")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_undecodable_image_is_bad_request() {
    let app = app_with(
        Arc::new(MockClassifier::new(Behaviour::RejectImage)),
        ServerConfig::default(),
    );

    let response = app
        .oneshot(multipart_request("file", b"not an image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "invalid_image_error");
}

#[tokio::test]
async fn test_inference_failure_is_server_error() {
    let app = app_with(
        Arc::new(MockClassifier::new(Behaviour::Fail)),
        ServerConfig::default(),
    );

    let response = app
        .oneshot(multipart_request("file", b"fake jpeg bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "server_error");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("forward pass failed"));
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let config = ServerConfig {
        max_upload_bytes: 64,
        ..Default::default()
    };
    let app = app_with(Arc::new(MockClassifier::sushi()), config);

    let response = app
        .oneshot(multipart_request("file", &[0u8; 4096]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_non_multipart_upload_gets_json_error() {
    let classifier = Arc::new(MockClassifier::sushi());
    let app = app_with(classifier.clone(), ServerConfig::default());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(&b"raw jpeg bytes"[..]))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert!(!body["error"]["message"].as_str().unwrap().is_empty());
    assert_eq!(classifier.call_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_embedded_static_assets() {
    let app = app_with(Arc::new(MockClassifier::sushi()), ServerConfig::default());

    let response = app
        .clone()
        .oneshot(Request::get("/static/client.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.contains("javascript"));

    let response = app
        .oneshot(Request::get("/static/missing.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assets_dir_override() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("view")).unwrap();
    std::fs::create_dir_all(dir.path().join("static")).unwrap();
    std::fs::write(
        dir.path().join("view").join("index.html"),
        "<html><body>custom page</body></html>",
    )
    .unwrap();
    std::fs::write(dir.path().join("static").join("app.css"), "body { color: red; }").unwrap();

    let config = ServerConfig {
        assets_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let app = app_with(Arc::new(MockClassifier::sushi()), config);

    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text_body(response).await.contains("custom page"));

    let response = app
        .oneshot(Request::get("/static/app.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text_body(response).await, "body { color: red; }");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = app_with(Arc::new(MockClassifier::sushi()), ServerConfig::default());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/analyze")
        .header(header::ORIGIN, "https://somewhere.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-requested-with")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let allowed = response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("x-requested-with"));
    assert!(allowed.contains("content-type"));
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = app_with(Arc::new(MockClassifier::sushi()), ServerConfig::default());

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "mock-food");

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

use crate::server::upload::read_file_field;
use crate::server::AppError;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use foodlens_core::{Prediction, ScoredLabel};
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// Health endpoints
// ============================================================================

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.classifier.name(),
    }))
}

pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

// ============================================================================
// Classification endpoint
// ============================================================================

/// Response body for `/analyze`
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Label followed by `[class_index, confidence]`
    pub result: String,
    pub label: String,
    pub class_index: usize,
    pub confidence: f32,
    pub top_k: Vec<ScoredLabel>,
    pub latency_us: u64,
}

impl From<Prediction> for AnalyzeResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            result: prediction.summary(),
            label: prediction.label,
            class_index: prediction.class_index,
            confidence: prediction.confidence,
            top_k: prediction.top_k,
            latency_us: prediction.latency_us,
        }
    }
}

pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let request_id = Uuid::new_v4();
    metrics::counter!("foodlens_requests_total").increment(1);

    let image = read_file_field(multipart?).await?;
    tracing::debug!(%request_id, bytes = image.len(), "Received upload");

    let prediction = state.classifier.classify(&image).await?;
    metrics::histogram!("foodlens_inference_latency_us").record(prediction.latency_us as f64);

    tracing::info!(
        %request_id,
        label = %prediction.label,
        confidence = prediction.confidence,
        "Classified upload in {}us",
        prediction.latency_us
    );

    Ok(Json(AnalyzeResponse::from(prediction)))
}

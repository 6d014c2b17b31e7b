use crate::config::ServerConfig;
use foodlens_classifier::ImageClassifier;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Predictor loaded at startup, read-only afterwards
    pub classifier: Arc<dyn ImageClassifier>,

    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Prometheus handle for `/metrics` (absent when no recorder is installed)
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn ImageClassifier>, config: ServerConfig) -> Self {
        Self {
            classifier,
            config: Arc::new(config),
            metrics: None,
        }
    }

    /// Attach the Prometheus handle used to render `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

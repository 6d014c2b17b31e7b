//! Classifier trait

use crate::labels::ClassList;
use async_trait::async_trait;
use foodlens_core::{Prediction, Result};

/// Trait for image classifiers
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Classify encoded image bytes (PNG, JPEG, ...)
    async fn classify(&self, image: &[u8]) -> Result<Prediction>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Labels this classifier can produce
    fn classes(&self) -> &ClassList;
}

/// Indices and probabilities of the `k` most likely classes, best first
pub fn top_k(probabilities: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(k.max(1));
    ranked
}

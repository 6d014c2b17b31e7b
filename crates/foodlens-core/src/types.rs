//! Core types for FoodLens

use serde::{Deserialize, Serialize};

/// A label paired with the probability the model assigned to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLabel {
    /// Human-readable class name
    pub label: String,

    /// Softmax probability (0.0-1.0)
    pub confidence: f32,
}

/// Outcome of classifying a single image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Winning class name
    pub label: String,

    /// Model output position of the winning class
    pub class_index: usize,

    /// Probability of the winning class (0.0-1.0)
    pub confidence: f32,

    /// Best classes in descending order of confidence, winner first
    #[serde(default)]
    pub top_k: Vec<ScoredLabel>,

    /// Inference latency in microseconds
    #[serde(default)]
    pub latency_us: u64,
}

impl Prediction {
    /// Create a new prediction with no alternatives
    pub fn new(label: impl Into<String>, class_index: usize, confidence: f32) -> Self {
        Self {
            label: label.into(),
            class_index,
            confidence,
            top_k: Vec::new(),
            latency_us: 0,
        }
    }

    /// Attach the ranked alternatives
    pub fn with_top_k(mut self, top_k: Vec<ScoredLabel>) -> Self {
        self.top_k = top_k;
        self
    }

    /// Auxiliary prediction data as `[<class_index>, <confidence>]`
    pub fn auxiliary(&self) -> String {
        format!("[{}, {:.4}]", self.class_index, self.confidence)
    }

    /// Label followed by the auxiliary data, e.g. `sushi [6, 0.9132]`
    pub fn summary(&self) -> String {
        format!("{} {}", self.label, self.auxiliary())
    }
}

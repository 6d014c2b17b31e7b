//! Candle-backed image classifier

use crate::classifier::{top_k, ImageClassifier};
use crate::config::ModelConfigSpec;
use crate::labels::ClassList;
use crate::model_loader::LoadedModel;
use crate::preprocess::{decode_image, Processor};
use async_trait::async_trait;
use candle_core::D;
use foodlens_core::{Error, Prediction, Result, ScoredLabel};
use std::sync::Arc;
use std::time::Instant;

/// Image classifier running a Candle model loaded once at startup
#[derive(Clone)]
pub struct CandleImageClassifier {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    model: LoadedModel,
    classes: ClassList,
    processor: Processor,
    top_k: usize,
}

impl CandleImageClassifier {
    /// Assemble a classifier from an already-loaded model
    pub fn new(
        name: impl Into<String>,
        model: LoadedModel,
        classes: ClassList,
        processor: Processor,
        top_k: usize,
    ) -> Result<Self> {
        let outputs = model.metadata().num_classes;
        if outputs != classes.output_len() {
            return Err(Error::config(format!(
                "model has {} outputs but the class list maps {}",
                outputs,
                classes.output_len()
            )));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                name: name.into(),
                model,
                classes,
                processor,
                top_k,
            }),
        })
    }

    /// Fetch (once), load and wrap the model described by `spec`
    pub async fn load(spec: &ModelConfigSpec) -> Result<Self> {
        let classes = spec.class_list()?;
        let model = LoadedModel::load(&spec.to_model_config(), classes.output_len()).await?;
        let name = spec
            .name
            .clone()
            .unwrap_or_else(|| model.metadata().name.clone());

        tracing::info!(
            "Loaded classifier '{}' ({} classes, {} on {:?})",
            name,
            classes.output_len(),
            model.metadata().architecture,
            model.device()
        );

        Self::new(
            name,
            model,
            classes,
            Processor::new(spec.preprocess.clone()),
            spec.top_k,
        )
    }

    /// Blocking prediction; callers on the async runtime go through `classify`
    pub fn predict(&self, image: &[u8]) -> Result<Prediction> {
        self.inner.predict(image)
    }
}

impl Inner {
    fn predict(&self, image: &[u8]) -> Result<Prediction> {
        let start = Instant::now();

        let decoded = decode_image(image)?;
        let input = self.processor.to_tensor(&decoded, self.model.device())?;
        let logits = self.model.forward(&input)?;

        let probabilities = candle_nn::ops::softmax(&logits, D::Minus1)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| Error::classifier(format!("Failed to read model output: {}", e)))?;

        if probabilities.len() != self.classes.output_len() {
            return Err(Error::classifier(format!(
                "model produced {} scores for {} classes",
                probabilities.len(),
                self.classes.output_len()
            )));
        }

        let ranked = top_k(&probabilities, self.top_k);
        let mut alternatives = Vec::with_capacity(ranked.len());
        for (index, confidence) in &ranked {
            alternatives.push(ScoredLabel {
                label: self.classes.resolve(*index)?.to_string(),
                confidence: *confidence,
            });
        }

        let (class_index, confidence) = ranked[0];
        let mut prediction = Prediction::new(alternatives[0].label.clone(), class_index, confidence)
            .with_top_k(alternatives);
        prediction.latency_us = start.elapsed().as_micros() as u64;

        tracing::debug!(
            "Predicted '{}' ({:.4}) in {}us",
            prediction.label,
            prediction.confidence,
            prediction.latency_us
        );

        Ok(prediction)
    }
}

#[async_trait]
impl ImageClassifier for CandleImageClassifier {
    async fn classify(&self, image: &[u8]) -> Result<Prediction> {
        let inner = Arc::clone(&self.inner);
        let bytes = image.to_vec();

        tokio::task::spawn_blocking(move || inner.predict(&bytes))
            .await
            .map_err(|e| Error::internal(format!("inference task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn classes(&self) -> &ClassList {
        &self.inner.classes
    }
}

//! FoodLens Classifier
//!
//! Image classification backed by Candle.
//!
//! The model artifact is fetched once into a local cache, loaded at startup
//! and then shared read-only across requests. Uploaded images are decoded,
//! resized and normalised, run through the network, and the winning output
//! index is mapped to a human-readable label through a [`ClassList`].

pub mod classifier;
pub mod config;
pub mod fetch;
pub mod labels;
pub mod model_loader;
pub mod preprocess;
pub mod vision;

pub use classifier::{top_k, ImageClassifier};
pub use config::{ModelConfigSpec, ModelSourceSpec, DEFAULT_MODEL_URL};
pub use fetch::ensure_artifact;
pub use labels::{ClassList, FOOD_CLASSES};
pub use model_loader::{
    explain_load_failure, Architecture, DeviceType, LoadedModel, ModelConfig, ModelFormat,
    ModelSource,
};
pub use preprocess::{decode_image, PreprocessConfig, Processor};
pub use vision::CandleImageClassifier;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::ImageClassifier;
    pub use crate::labels::ClassList;
    pub use crate::model_loader::{Architecture, DeviceType, LoadedModel, ModelConfig, ModelSource};
    pub use crate::vision::CandleImageClassifier;
}

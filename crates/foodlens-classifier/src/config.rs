//! Configuration for the classifier model (YAML-facing)

use crate::labels::ClassList;
use crate::model_loader::{Architecture, DeviceType, ModelConfig, ModelFormat, ModelSource};
use crate::preprocess::PreprocessConfig;
use foodlens_core::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Location the food model artifact is fetched from when nothing else is configured
pub const DEFAULT_MODEL_URL: &str = "https://websofttechnology.s3.amazonaws.com/MLCLub/food.pkl";

/// File name the default artifact is cached under
pub const DEFAULT_MODEL_FILENAME: &str = "food.pkl";

/// Model configuration specification (for YAML/config files)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfigSpec {
    /// Display name; defaults to the weights file stem
    #[serde(default)]
    pub name: Option<String>,

    /// Where the weights come from
    #[serde(default)]
    pub source: ModelSourceSpec,

    #[serde(default)]
    pub architecture: Architecture,

    /// `cpu`, `cuda[:n]` or `metal[:n]`
    #[serde(default)]
    pub device: DeviceType,

    /// Weights format; inferred from the file extension when unset
    #[serde(default)]
    pub format: Option<ModelFormat>,

    /// Directory downloaded artifacts are cached in
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Class names, one per line; the built-in food list when unset
    #[serde(default)]
    pub labels: Option<PathBuf>,

    /// Training vocabulary of 1-based category ids, one per line
    #[serde(default)]
    pub vocab: Option<PathBuf>,

    #[serde(default)]
    pub preprocess: PreprocessConfig,

    /// Number of ranked alternatives reported per prediction
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for ModelConfigSpec {
    fn default() -> Self {
        Self {
            name: None,
            source: ModelSourceSpec::default(),
            architecture: Architecture::default(),
            device: DeviceType::default(),
            format: None,
            models_dir: default_models_dir(),
            labels: None,
            vocab: None,
            preprocess: PreprocessConfig::default(),
            top_k: default_top_k(),
        }
    }
}

/// Model source specification (for config files)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSourceSpec {
    /// Plain HTTP(S) download, cached in `models_dir`
    Url {
        url: String,
        #[serde(default)]
        filename: Option<String>,
    },

    /// Hugging Face Hub
    HuggingFace {
        repo: String,
        filename: String,
        #[serde(default)]
        revision: Option<String>,
    },

    /// Local file path
    Local { path: PathBuf },
}

impl Default for ModelSourceSpec {
    fn default() -> Self {
        Self::Url {
            url: DEFAULT_MODEL_URL.to_string(),
            filename: Some(DEFAULT_MODEL_FILENAME.to_string()),
        }
    }
}

impl ModelSourceSpec {
    /// Convert to the runtime source
    pub fn to_model_source(&self) -> ModelSource {
        match self {
            Self::Url { url, filename } => ModelSource::Url {
                url: url.clone(),
                filename: filename
                    .clone()
                    .unwrap_or_else(|| filename_from_url(url)),
            },
            Self::HuggingFace {
                repo,
                filename,
                revision,
            } => ModelSource::HuggingFace {
                repo_id: repo.clone(),
                revision: revision.clone(),
                filename: filename.clone(),
            },
            Self::Local { path } => ModelSource::LocalPath(path.clone()),
        }
    }
}

impl ModelConfigSpec {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Convert to ModelConfig for loading
    pub fn to_model_config(&self) -> ModelConfig {
        ModelConfig {
            source: self.source.to_model_source(),
            device: self.device,
            format: self.format,
            architecture: self.architecture,
            models_dir: self.models_dir.clone(),
        }
    }

    /// Build the class list from the configured label and vocabulary files.
    ///
    /// Without a labels file the built-in food list is used together with the
    /// default model's vocabulary; a configured vocabulary file replaces it.
    pub fn class_list(&self) -> Result<ClassList> {
        let classes = match &self.labels {
            Some(path) => ClassList::from_file(path)?,
            None => ClassList::food(),
        };

        match &self.vocab {
            Some(path) => classes.with_vocab_file(path),
            None => Ok(classes),
        }
    }
}

/// Last path segment of a URL, without query or fragment
fn filename_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("model.bin")
        .to_string()
}

pub fn default_models_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("foodlens").join("models"))
        .unwrap_or_else(|| PathBuf::from("./models"))
}

fn default_top_k() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let spec = ModelConfigSpec::from_yaml("{}").unwrap();
        let config = spec.to_model_config();

        assert_eq!(
            config.source,
            ModelSource::Url {
                url: DEFAULT_MODEL_URL.to_string(),
                filename: DEFAULT_MODEL_FILENAME.to_string(),
            }
        );
        assert_eq!(config.device, DeviceType::Cpu);
        assert_eq!(config.architecture, Architecture::ResNet34);
        assert_eq!(spec.top_k, 3);
        let classes = spec.class_list().unwrap();
        assert_eq!(classes.len(), 100);
        assert_eq!(classes.resolve(1).unwrap(), "tempura bowl");
    }

    #[test]
    fn test_model_config_yaml() {
        let yaml = r#"
name: food-resnet50
source:
  type: huggingface
  repo: acme/food-100
  filename: model.safetensors
architecture: resnet50
device: cuda:1
models_dir: ./my-models
top_k: 5
preprocess:
  height: 256
  width: 256
"#;

        let spec = ModelConfigSpec::from_yaml(yaml).unwrap();
        let config = spec.to_model_config();

        assert_eq!(spec.name.as_deref(), Some("food-resnet50"));
        assert!(matches!(
            config.source,
            ModelSource::HuggingFace { ref repo_id, revision: None, .. } if repo_id == "acme/food-100"
        ));
        assert_eq!(config.architecture, Architecture::ResNet50);
        assert_eq!(config.device, DeviceType::Cuda(1));
        assert_eq!(config.models_dir, PathBuf::from("./my-models"));
        assert_eq!(spec.preprocess.height, 256);
        assert_eq!(spec.top_k, 5);
    }

    #[test]
    fn test_local_source_and_format() {
        let yaml = r#"
source:
  type: local
  path: ./weights/food.bin
format: safetensors
"#;
        let spec = ModelConfigSpec::from_yaml(yaml).unwrap();
        let config = spec.to_model_config();

        assert_eq!(config.source, ModelSource::LocalPath(PathBuf::from("./weights/food.bin")));
        assert_eq!(config.format, Some(ModelFormat::SafeTensors));
    }

    #[test]
    fn test_url_filename_inferred() {
        let spec = ModelSourceSpec::Url {
            url: "https://example.com/models/food-v2.safetensors?sig=abc".to_string(),
            filename: None,
        };
        assert_eq!(
            spec.to_model_source(),
            ModelSource::Url {
                url: "https://example.com/models/food-v2.safetensors?sig=abc".to_string(),
                filename: "food-v2.safetensors".to_string(),
            }
        );
        assert_eq!(filename_from_url("https://example.com/"), "model.bin");
    }

    #[test]
    fn test_device_yaml() {
        let device: DeviceType = serde_yaml::from_str("metal:2").unwrap();
        assert_eq!(device, DeviceType::Metal(2));
        assert!(serde_yaml::from_str::<DeviceType>("tpu").is_err());
    }

    #[test]
    fn test_class_list_with_vocab() {
        let dir = tempfile::tempdir().unwrap();
        let labels = dir.path().join("labels.txt");
        let vocab = dir.path().join("vocab.txt");
        std::fs::write(&labels, "rice\nsushi\n").unwrap();
        std::fs::write(&vocab, "2\n1\n").unwrap();

        let spec = ModelConfigSpec {
            labels: Some(labels),
            vocab: Some(vocab),
            ..Default::default()
        };
        let classes = spec.class_list().unwrap();
        assert_eq!(classes.resolve(0).unwrap(), "sushi");
    }
}

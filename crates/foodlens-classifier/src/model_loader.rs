//! Model loading for Candle-based image classifiers

use crate::fetch;
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Func, VarBuilder};
use candle_transformers::models::resnet;
use foodlens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration for loading a Candle model
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Source of the model
    pub source: ModelSource,

    /// Device to run inference on
    pub device: DeviceType,

    /// Weights format; inferred from the file extension when unset
    pub format: Option<ModelFormat>,

    /// Network the weights belong to
    pub architecture: Architecture,

    /// Directory downloaded artifacts are cached in
    pub models_dir: PathBuf,
}

/// Source location for model weights
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// Load from local file system
    LocalPath(PathBuf),

    /// Download once from a plain URL into the models directory
    Url { url: String, filename: String },

    /// Download from Hugging Face Hub
    HuggingFace {
        repo_id: String,
        revision: Option<String>,
        filename: String,
    },
}

/// Device type for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceType {
    /// CPU inference (always available)
    #[default]
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize), // GPU index
    /// Metal (Apple Silicon)
    Metal(usize),
}

impl FromStr for DeviceType {
    type Err = String;

    /// Parses `cpu`, `cuda`, `cuda:<n>`, `metal`, `metal:<n>`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (kind, index) = match s.split_once(':') {
            Some((kind, index)) => {
                let index = index
                    .parse::<usize>()
                    .map_err(|_| format!("invalid device index in '{}'", s))?;
                (kind, index)
            }
            None => (s, 0),
        };

        match kind.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda(index)),
            "metal" | "mps" => Ok(Self::Metal(index)),
            other => Err(format!("unknown device '{}'", other)),
        }
    }
}

impl TryFrom<String> for DeviceType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceType> for String {
    fn from(device: DeviceType) -> Self {
        device.to_string()
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("cpu"),
            Self::Cuda(index) => write!(f, "cuda:{}", index),
            Self::Metal(index) => write!(f, "metal:{}", index),
        }
    }
}

/// Model file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// SafeTensors format (recommended)
    SafeTensors,
    /// PyTorch checkpoint (`.pth`, `.pt`, `.bin`, `.pkl`)
    PyTorch,
}

impl ModelFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("safetensors") => Self::SafeTensors,
            _ => Self::PyTorch,
        }
    }
}

/// Supported classification backbones, using torchvision tensor names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    ResNet18,
    #[default]
    ResNet34,
    ResNet50,
    ResNet101,
    ResNet152,
}

impl Architecture {
    fn build(self, num_classes: usize, vb: VarBuilder<'static>) -> candle_core::Result<Func<'static>> {
        match self {
            Self::ResNet18 => resnet::resnet18(num_classes, vb),
            Self::ResNet34 => resnet::resnet34(num_classes, vb),
            Self::ResNet50 => resnet::resnet50(num_classes, vb),
            Self::ResNet101 => resnet::resnet101(num_classes, vb),
            Self::ResNet152 => resnet::resnet152(num_classes, vb),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResNet18 => "resnet18",
            Self::ResNet34 => "resnet34",
            Self::ResNet50 => "resnet50",
            Self::ResNet101 => "resnet101",
            Self::ResNet152 => "resnet152",
        };
        f.write_str(name)
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "resnet18" => Ok(Self::ResNet18),
            "resnet34" => Ok(Self::ResNet34),
            "resnet50" => Ok(Self::ResNet50),
            "resnet101" => Ok(Self::ResNet101),
            "resnet152" => Ok(Self::ResNet152),
            other => Err(format!("unsupported architecture '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    pub architecture: Architecture,

    /// Number of outputs of the classification head
    pub num_classes: usize,
}

/// Loaded Candle model, immutable after construction
pub struct LoadedModel {
    model: Func<'static>,

    /// Device the model is on
    device: Device,

    metadata: ModelMetadata,
}

impl LoadedModel {
    /// Resolve the artifact (downloading it at most once) and load it
    pub async fn load(config: &ModelConfig, num_classes: usize) -> Result<Self> {
        let weights_path = fetch::ensure_artifact(&config.source, &config.models_dir).await?;
        let device = create_device(config.device)?;
        let format = config
            .format
            .unwrap_or_else(|| ModelFormat::from_path(&weights_path));
        let architecture = config.architecture;

        tokio::task::spawn_blocking(move || {
            Self::from_weights(weights_path, format, architecture, device, num_classes)
        })
        .await
        .map_err(|e| Error::internal(format!("model load task failed: {}", e)))?
    }

    /// Build the network from a weights file already on disk
    pub fn from_weights(
        weights_path: PathBuf,
        format: ModelFormat,
        architecture: Architecture,
        device: Device,
        num_classes: usize,
    ) -> Result<Self> {
        if num_classes == 0 {
            return Err(Error::config("model must have at least one class"));
        }

        tracing::info!(
            "Loading {} weights from {} ({:?}, {} classes)",
            architecture,
            weights_path.display(),
            format,
            num_classes
        );

        // SAFETY: the weights file is not modified while it is mapped
        let vb = match format {
            ModelFormat::SafeTensors => unsafe {
                VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, &device)
            },
            ModelFormat::PyTorch => VarBuilder::from_pth(&weights_path, DType::F32, &device),
        }
        .map_err(|e| explain_load_failure(e, architecture, num_classes))?;

        let model = architecture
            .build(num_classes, vb)
            .map_err(|e| explain_load_failure(e, architecture, num_classes))?;

        let name = weights_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            model,
            device,
            metadata: ModelMetadata {
                name,
                architecture,
                num_classes,
            },
        })
    }

    /// Run the network on a `[N, 3, H, W]` batch, returning `[N, num_classes]` logits
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        self.model
            .forward(input)
            .map_err(|e| Error::classifier(format!("Model forward pass failed: {}", e)))
    }

    /// Get reference to the device
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Get model metadata
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// Create Candle device from device type
pub fn create_device(device_type: DeviceType) -> Result<Device> {
    match device_type {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda(idx) => Device::new_cuda(idx)
            .map_err(|e| Error::classifier(format!("Failed to create CUDA device: {}", e))),
        DeviceType::Metal(idx) => Device::new_metal(idx)
            .map_err(|e| Error::classifier(format!("Failed to create Metal device: {}", e))),
    }
}

/// Separate weights that do not fit the network from every other load failure.
///
/// Missing tensors or mismatched shapes mean the artifact was exported for a
/// different layout or class count; that case gets an operator-facing message.
/// Anything else is passed through as a classifier error.
pub fn explain_load_failure(
    err: candle_core::Error,
    architecture: Architecture,
    num_classes: usize,
) -> Error {
    let detail = err.to_string();
    let incompatible = ["cannot find tensor", "shape mismatch", "unexpected shape"]
        .iter()
        .any(|needle| detail.contains(needle));

    if incompatible {
        tracing::error!("Model weights do not fit {}: {}", architecture, detail);
        Error::incompatible_model(format!(
            "\n\nThis model was exported in a layout that does not match a {arch} with {n} output classes.\n\n\
             Export the weights again from your training environment as a {arch} state dict \
             (torchvision tensor names) whose final layer has {n} outputs, or update the class list \
             to match the model.\n\nLoader reported: {detail}",
            arch = architecture,
            n = num_classes,
            detail = detail,
        ))
    } else {
        Error::classifier(format!("Failed to load model weights: {}", detail))
    }
}

//! Image decoding and tensor preparation

use candle_core::{DType, Device, Tensor};
use foodlens_core::{Error, Result};
use image::{imageops::FilterType, DynamicImage};
use serde::{Deserialize, Serialize};

/// ImageNet channel means, used by torchvision-style backbones
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet channel standard deviations
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    #[serde(default = "default_mean")]
    pub mean: [f32; 3],
    #[serde(default = "default_std")]
    pub std: [f32; 3],
    #[serde(default = "default_input_size")]
    pub height: usize,
    #[serde(default = "default_input_size")]
    pub width: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
            height: default_input_size(),
            width: default_input_size(),
        }
    }
}

fn default_mean() -> [f32; 3] {
    IMAGENET_MEAN
}

fn default_std() -> [f32; 3] {
    IMAGENET_STD
}

fn default_input_size() -> usize {
    224
}

/// Decode uploaded bytes in any supported format
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(Error::invalid_image("upload is empty"));
    }
    image::load_from_memory(bytes).map_err(|e| Error::invalid_image(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct Processor {
    pub config: PreprocessConfig,
}

impl Processor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Resize, scale to [0, 1] and normalise into a `[1, 3, H, W]` tensor
    pub fn to_tensor(&self, image: &DynamicImage, device: &Device) -> Result<Tensor> {
        let (height, width) = (self.config.height, self.config.width);
        if height == 0 || width == 0 {
            return Err(Error::config("input size must be non-zero"));
        }

        let rgb = image
            .resize_exact(width as u32, height as u32, FilterType::Triangle)
            .to_rgb8()
            .into_raw();

        let tensor = Tensor::from_vec(rgb, (height, width, 3), device)
            .and_then(|t| t.permute((2, 0, 1)))
            .and_then(|t| t.to_dtype(DType::F32))
            .and_then(|t| t / 255.)
            .map_err(|e| Error::classifier(format!("Failed to build input tensor: {}", e)))?;

        let mean = Tensor::new(&self.config.mean, device).and_then(|t| t.reshape((3, 1, 1)));
        let std = Tensor::new(&self.config.std, device).and_then(|t| t.reshape((3, 1, 1)));

        mean.and_then(|mean| {
            let std = std?;
            tensor.broadcast_sub(&mean)?.broadcast_div(&std)?.unsqueeze(0)
        })
        .map_err(|e| Error::classifier(format!("Failed to normalise input: {}", e)))
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(PreprocessConfig::default())
    }
}

//! Server configuration

use crate::cli::ModelArgs;
use foodlens_classifier::{ModelConfigSpec, ModelSourceSpec};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Directory holding `view/index.html` and `static/`; embedded assets when unset
    #[serde(default)]
    pub assets_dir: Option<PathBuf>,

    #[serde(default)]
    pub cors: CorsConfig,

    /// Classifier model
    #[serde(default)]
    pub model: ModelConfigSpec,
}

impl ServerConfig {
    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply CLI model overrides
    pub fn apply_model_args(&mut self, args: &ModelArgs) {
        if let Some(url) = &args.model_url {
            self.model.source = ModelSourceSpec::Url {
                url: url.clone(),
                filename: None,
            };
        }

        if let Some(models_dir) = &args.models_dir {
            self.model.models_dir = models_dir.clone();
        }

        if let Some(device) = args.device {
            self.model.device = device;
        }

        if let Some(architecture) = args.architecture {
            self.model.architecture = architecture;
        }

        if let Some(labels) = &args.labels {
            self.model.labels = Some(labels.clone());
        }
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.listen, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            assets_dir: None,
            cors: CorsConfig::default(),
            model: ModelConfigSpec::default(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any
    #[serde(default = "default_allow_origins")]
    pub allow_origins: Vec<String>,

    /// Allowed request headers
    #[serde(default = "default_allow_headers")]
    pub allow_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: default_allow_origins(),
            allow_headers: default_allow_headers(),
        }
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.iter().any(|origin| origin == "*")
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_allow_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_allow_headers() -> Vec<String> {
    vec!["X-Requested-With".to_string(), "Content-Type".to_string()]
}

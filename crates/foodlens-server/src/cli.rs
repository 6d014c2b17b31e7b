use clap::{Args, Parser, Subcommand};
use foodlens_classifier::{Architecture, DeviceType};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "foodlens")]
#[command(author, version, about = "Classify food photos over HTTP")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the model if needed, load it, and serve the web UI and API
    Serve {
        /// Configuration file path
        #[arg(short, long, default_value = "foodlens.yaml")]
        config: PathBuf,

        /// Listen address
        #[arg(short, long, env = "FOODLENS_LISTEN")]
        listen: Option<String>,

        /// Listen port
        #[arg(short = 'P', long, env = "FOODLENS_PORT")]
        port: Option<u16>,

        /// Serve the page and /static from this directory instead of the embedded assets
        #[arg(long, env = "FOODLENS_ASSETS_DIR")]
        assets_dir: Option<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Download the model artifact into the cache and exit
    Fetch {
        /// Configuration file path
        #[arg(short, long, default_value = "foodlens.yaml")]
        config: PathBuf,

        #[command(flatten)]
        model: ModelArgs,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Model overrides shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// URL of the model artifact; fetched once and cached
    #[arg(long, env = "FOODLENS_MODEL_URL")]
    pub model_url: Option<String>,

    /// Directory downloaded artifacts are cached in
    #[arg(long, env = "FOODLENS_MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Inference device: cpu, cuda[:n], metal[:n]
    #[arg(long, env = "FOODLENS_DEVICE")]
    pub device: Option<DeviceType>,

    /// Network the weights belong to (resnet18, resnet34, resnet50, ...)
    #[arg(long)]
    pub architecture: Option<Architecture>,

    /// Class names file, one label per line
    #[arg(long)]
    pub labels: Option<PathBuf>,
}

//! FoodLens
//!
//! Fetches a pretrained food classifier once, loads it at startup, and serves
//! an upload page plus a `/analyze` endpoint that returns the predicted dish.

use anyhow::Result;
use clap::Parser;
use foodlens_classifier::{ensure_artifact, CandleImageClassifier};
use foodlens_core::Error;
use foodlens_server::cli::{Cli, Commands};
use foodlens_server::config::ServerConfig;
use foodlens_server::server::run_server;
use foodlens_server::state::AppState;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            listen,
            port,
            assets_dir,
            model,
            verbose,
        } => {
            init_logging(verbose);

            let mut config = ServerConfig::load(&config)?;
            config.apply_model_args(&model);
            if let Some(listen) = listen {
                config.listen = listen;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(assets_dir) = assets_dir {
                config.assets_dir = Some(assets_dir);
            }
            let addr = config.socket_addr()?;

            let metrics_handle = init_metrics()?;

            // The listener is only bound once the model is in memory
            info!("Preparing model...");
            let classifier = match CandleImageClassifier::load(&config.model).await {
                Ok(classifier) => classifier,
                Err(e @ Error::IncompatibleModel(_)) => {
                    error!("{}", e);
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            };

            let state = AppState::new(Arc::new(classifier), config).with_metrics(metrics_handle);
            run_server(state, addr).await?;
        }

        Commands::Fetch {
            config,
            model,
            verbose,
        } => {
            init_logging(verbose);

            let mut config = ServerConfig::load(&config)?;
            config.apply_model_args(&model);

            let model_config = config.model.to_model_config();
            let path = ensure_artifact(&model_config.source, &model_config.models_dir).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "foodlens=debug,foodlens_server=debug,foodlens_classifier=debug,tower_http=debug"
    } else {
        "foodlens=info,foodlens_server=info,foodlens_classifier=info,tower_http=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "foodlens_requests_total",
        "Total number of /analyze requests received"
    );
    metrics::describe_counter!("foodlens_errors_total", "Total number of failed requests by type");
    metrics::describe_histogram!(
        "foodlens_inference_latency_us",
        metrics::Unit::Microseconds,
        "Image classification latency in microseconds"
    );

    Ok(handle)
}

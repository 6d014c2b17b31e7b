//! Fetch-once model artifact resolution
//!
//! Artifacts are downloaded at most once: a file already present in the
//! models directory is returned without touching the network.

use crate::model_loader::ModelSource;
use foodlens_core::{Error, Result};
use futures_util::StreamExt;
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Make sure the artifact for `source` exists locally and return its path
pub async fn ensure_artifact(source: &ModelSource, models_dir: &Path) -> Result<PathBuf> {
    match source {
        ModelSource::LocalPath(path) => {
            if !path.exists() {
                return Err(Error::config(format!(
                    "Model file not found: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::Url { url, filename } => {
            let dest = models_dir.join(filename);
            if dest.exists() {
                tracing::info!("Using cached model artifact {}", dest.display());
                return Ok(dest);
            }

            tokio::fs::create_dir_all(models_dir).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create models directory {}: {}",
                    models_dir.display(),
                    e
                ))
            })?;

            let client = reqwest::Client::new();
            download_file(&client, url, &dest).await?;
            Ok(dest)
        }
        ModelSource::HuggingFace {
            repo_id,
            revision,
            filename,
        } => {
            let repo_id = repo_id.clone();
            let revision = revision.clone().unwrap_or_else(|| "main".to_string());
            let filename = filename.clone();

            tokio::task::spawn_blocking(move || fetch_from_hub(&repo_id, &revision, &filename))
                .await
                .map_err(|e| Error::internal(format!("Hub download task failed: {}", e)))?
        }
    }
}

/// Stream `url` into `dest`, going through a `.part` file so an interrupted
/// transfer never leaves a truncated artifact at the final path
pub async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    tracing::info!("Downloading model artifact from {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::download(format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::download(format!("{} returned {}", url, status)));
    }

    let partial = partial_path(dest);
    let result = write_body(response, &partial).await;

    match result {
        Ok(bytes) => {
            tokio::fs::rename(&partial, dest).await?;
            tracing::info!("Saved {} bytes to {}", bytes, dest.display());
            Ok(())
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            Err(e)
        }
    }
}

async fn write_body(response: reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::download(format!("body read failed: {}", e)))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

fn fetch_from_hub(repo_id: &str, revision: &str, filename: &str) -> Result<PathBuf> {
    tracing::info!("Fetching {} from Hugging Face: {} @ {}", filename, repo_id, revision);

    let api = Api::new()
        .map_err(|e| Error::download(format!("Failed to initialize HF API: {}", e)))?;

    let repo = api.repo(Repo::with_revision(
        repo_id.to_string(),
        RepoType::Model,
        revision.to_string(),
    ));

    repo.get(filename)
        .map_err(|e| Error::download(format!("Failed to download model from HF: {}", e)))
}

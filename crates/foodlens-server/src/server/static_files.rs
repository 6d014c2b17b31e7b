use crate::server::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "web/"]
struct WebAssets;

/// Serve the upload page, from the assets directory when one is configured
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    if let Some(dir) = &state.config.assets_dir {
        let path = dir.join("view").join("index.html");
        let page = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AppError::Internal(format!("Failed to read {}: {}", path.display(), e))
        })?;
        return Ok(Html(page));
    }

    let content = <WebAssets as Embed>::get("view/index.html")
        .ok_or_else(|| AppError::Internal("embedded index.html missing".to_string()))?;
    Ok(Html(String::from_utf8_lossy(&content.data).into_owned()))
}

/// Serve embedded files under `/static`
pub async fn serve_static(Path(path): Path<String>) -> Response {
    let path = format!("static/{}", path.trim_start_matches('/'));

    match <WebAssets as Embed>::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

//! Image Serving Handler
//!
//! Serves files written by the image store. Only plain filenames resolve;
//! anything path-like 404s before touching the filesystem.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/image/:filename - 读取已存储的图片
pub async fn serve_image(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let path = state
        .image_store
        .path_for(&filename)
        .ok_or_else(|| AppError::not_found(format!("Image {} not found", filename)))?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::internal(format!("Failed to read image: {}", e)))?;

    let mime = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}

//! Health Handlers

use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

/// 简单健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (healthy | error)
    status: &'static str,
    /// 版本号
    version: &'static str,
}

/// GET / - 存活探测
pub async fn home() -> Json<Value> {
    Json(json!({ "status": "Backend running" }))
}

/// GET /health - 基础健康检查
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

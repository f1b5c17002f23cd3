//! AI 分析模块
//!
//! 独立的问题分析接口，不创建工单。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/resolve-with-ai", post(handler::resolve_with_ai))
        .route("/analyses", get(handler::list_analyses))
}

//! AI Analysis Handlers
//!
//! Runs the analyzer on a bare description and keeps an audit record in the
//! `ai_analysis` table. No issue is created here.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{AiAnalysis, AnalysisRecord};
use crate::db::repository::AnalysisRepository;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: AiAnalysis,
    pub record_id: String,
}

/// POST /resolve-with-ai - 即席 AI 分析
pub async fn resolve_with_ai(
    State(state): State<ServerState>,
    Json(req): Json<AnalyzeRequest>,
) -> AppResult<Json<AnalyzeResponse>> {
    if req.description.trim().is_empty() {
        return Err(AppError::validation("description is required"));
    }

    let analysis = state.analyzer.analyze(&req.description).await;

    let record = AnalysisRecord::new(req.description, analysis.clone());
    let created = AnalysisRepository::new(state.get_db()).create(record).await?;

    let record_id = created
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();

    tracing::info!(record_id = %record_id, "Standalone analysis stored");

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
        record_id,
    }))
}

/// GET /analyses - 历史分析记录 (最新优先)
pub async fn list_analyses(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<AnalysisRecord>>> {
    let records = AnalysisRepository::new(state.get_db()).find_all().await?;
    Ok(Json(records))
}

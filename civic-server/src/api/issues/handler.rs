//! Issue API Handlers
//!
//! Citizen submission runs the analyzer inline — a model outage degrades to
//! the fallback analysis but never fails the report. Status updates and
//! assignment go through the workflow engine and land as single atomic
//! merges.

use axum::{
    Form, Json,
    extract::{Multipart, Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::ServerState;
use crate::db::models::{Issue, IssueStatus};
use crate::db::repository::IssueRepository;
use crate::utils::{AppError, AppResult};
use crate::workflow;
use crate::workflow::StatusChange;

/// Issue enriched with its derived maps link, as returned by the list APIs
#[derive(Debug, Serialize)]
pub struct IssueView {
    #[serde(flatten)]
    pub issue: Issue,
    pub maps_link: String,
}

impl From<Issue> for IssueView {
    fn from(issue: Issue) -> Self {
        let maps_link = issue.maps_link();
        Self { issue, maps_link }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportIssueResponse {
    pub success: bool,
    pub message: &'static str,
    pub issue_id: String,
    pub maps_link: String,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub maps_link: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub message: &'static str,
    pub issue_id: String,
    /// JSON-safe echo of the applied patch; timestamps appear as the
    /// stable marker string, never the storage sentinel
    pub update: Value,
}

#[derive(Debug, Deserialize)]
pub struct AssignOfficerRequest {
    pub officer_id: String,
    pub officer_name: String,
}

#[derive(Debug, Serialize)]
pub struct AssignOfficerResponse {
    pub message: &'static str,
    pub issue_id: String,
    pub assigned_to: String,
}

/// POST /report-issue - 市民上报问题
///
/// Multipart fields: `description`, `latitude`, `longitude`, optional
/// `image`. Validation happens before any external call; an image-store
/// failure is logged and the report proceeds without an image.
pub async fn report_issue(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<ReportIssueResponse>> {
    let mut description: Option<String> = None;
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "description" => description = Some(field.text().await?),
            "latitude" => latitude = Some(parse_coordinate(&field.text().await?, "latitude")?),
            "longitude" => longitude = Some(parse_coordinate(&field.text().await?, "longitude")?),
            "image" => {
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    image = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }

    let description = description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::validation("description is required".to_string()))?;
    let latitude =
        latitude.ok_or_else(|| AppError::validation("latitude is required".to_string()))?;
    let longitude =
        longitude.ok_or_else(|| AppError::validation("longitude is required".to_string()))?;

    let image_url = image.and_then(|data| match state.image_store.store(&data) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(error = %e, "Image upload failed, continuing without image");
            None
        }
    });

    // Never fails: model outages collapse into the fallback analysis
    let analysis = state.analyzer.analyze(&description).await;

    let issue = Issue::new(description, latitude, longitude, image_url, analysis);
    let created = IssueRepository::new(state.get_db()).create(issue).await?;

    let maps_link = created.maps_link();
    let issue_id = created
        .id_string()
        .ok_or_else(|| AppError::internal("Created issue has no id".to_string()))?;

    tracing::info!(issue_id = %issue_id, "Issue reported");

    Ok(Json(ReportIssueResponse {
        success: true,
        message: "Issue reported successfully",
        issue_id,
        maps_link,
    }))
}

/// GET /issues - 获取所有问题
pub async fn list_issues(State(state): State<ServerState>) -> AppResult<Json<Vec<IssueView>>> {
    let issues = IssueRepository::new(state.get_db()).find_all().await?;
    Ok(Json(issues.into_iter().map(IssueView::from).collect()))
}

/// GET /issues/:status - 按状态获取问题 (大小写不敏感)
pub async fn list_issues_by_status(
    State(state): State<ServerState>,
    Path(status): Path<String>,
) -> AppResult<Json<Vec<IssueView>>> {
    let status = IssueStatus::parse(&status).ok_or_else(|| {
        AppError::validation(format!(
            "Invalid status '{}': expected Pending, In-Progress or Resolved",
            status
        ))
    })?;
    let issues = IssueRepository::new(state.get_db())
        .find_by_status(status)
        .await?;
    Ok(Json(issues.into_iter().map(IssueView::from).collect()))
}

/// GET /navigate/:issue_id - 获取导航链接
pub async fn navigate(
    State(state): State<ServerState>,
    Path(issue_id): Path<String>,
) -> AppResult<Json<NavigateResponse>> {
    let issue = IssueRepository::new(state.get_db())
        .find_by_id(&issue_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Issue {} not found", issue_id)))?;

    Ok(Json(NavigateResponse {
        maps_link: issue.maps_link(),
    }))
}

/// POST /update-status/:issue_id - 政府更新问题状态
///
/// Multipart fields: `status` (required), `notes`, `reopen`, optional
/// `proof_image`.
pub async fn update_status(
    State(state): State<ServerState>,
    Path(issue_id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<UpdateStatusResponse>> {
    let mut status: Option<String> = None;
    let mut notes: Option<String> = None;
    let mut reopen = false;
    let mut proof_image: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "status" => status = Some(field.text().await?),
            "notes" => notes = Some(field.text().await?),
            "reopen" => reopen = parse_flag(&field.text().await?),
            "proof_image" => {
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    proof_image = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }

    let status = status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::validation("status is required".to_string()))?;

    let repo = IssueRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&issue_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Issue {} not found", issue_id)))?;

    let proof_image_url = proof_image.and_then(|data| match state.image_store.store(&data) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(error = %e, "Proof image upload failed, continuing without it");
            None
        }
    });

    let patch = workflow::build_status_update(
        &existing,
        &StatusChange {
            status,
            notes,
            reopen,
            proof_image_url,
        },
    )?;

    let update = patch.response_view();
    let updated = repo.apply_status_update(&issue_id, &patch).await?;

    tracing::info!(
        issue_id = %issue_id,
        status = %updated.status.as_str(),
        "Issue status updated"
    );

    Ok(Json(UpdateStatusResponse {
        message: "Issue status updated successfully",
        issue_id,
        update,
    }))
}

/// POST /assign-officer/:issue_id - 指派处理人员
pub async fn assign_officer(
    State(state): State<ServerState>,
    Path(issue_id): Path<String>,
    Form(req): Form<AssignOfficerRequest>,
) -> AppResult<Json<AssignOfficerResponse>> {
    if req.officer_id.trim().is_empty() || req.officer_name.trim().is_empty() {
        return Err(AppError::validation(
            "officer_id and officer_name are required".to_string(),
        ));
    }

    let repo = IssueRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&issue_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Issue {} not found", issue_id)))?;

    let patch = workflow::build_assignment(&existing, &req.officer_id, &req.officer_name);
    repo.apply_assignment(&issue_id, &patch).await?;

    tracing::info!(
        issue_id = %issue_id,
        officer_id = %req.officer_id,
        "Officer assigned"
    );

    Ok(Json(AssignOfficerResponse {
        message: "Officer assigned successfully",
        issue_id,
        assigned_to: req.officer_name,
    }))
}

/// GET /officer/issues/:officer_id - 查看指派给某处理人员的问题
pub async fn officer_issues(
    State(state): State<ServerState>,
    Path(officer_id): Path<String>,
) -> AppResult<Json<Vec<IssueView>>> {
    let issues = IssueRepository::new(state.get_db())
        .find_by_officer(&officer_id)
        .await?;
    Ok(Json(issues.into_iter().map(IssueView::from).collect()))
}

fn parse_coordinate(raw: &str, field: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::validation(format!("{} must be a decimal number", field)))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

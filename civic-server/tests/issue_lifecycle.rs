//! End-to-end lifecycle tests against an embedded database
//!
//! Each test opens its own RocksDB under a tempdir and injects a canned
//! language model, so nothing here touches the network.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use civic_server::api;
use civic_server::core::{Config, ServerState};
use civic_server::db::models::{AiAnalysis, Issue, IssueStatus, Severity, User};
use civic_server::db::repository::{IssueRepository, UserRepository};
use civic_server::services::LlmError;
use civic_server::workflow::{self, StatusChange};
use civic_server::LanguageModel;

/// Model that always fails, standing in for an unreachable API
struct DownModel;

#[async_trait]
impl LanguageModel for DownModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Transport("connection refused".to_string()))
    }
}

/// Model that returns a fixed response
struct CannedModel(&'static str);

#[async_trait]
impl LanguageModel for CannedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.0.to_string())
    }
}

async fn test_state(model: Arc<dyn LanguageModel>) -> (ServerState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize_with_model(&config, model)
        .await
        .unwrap();
    (state, dir)
}

async fn report(state: &ServerState, description: &str) -> Issue {
    let analysis = state.analyzer.analyze(description).await;
    let issue = Issue::new(description.to_string(), 12.97, 77.59, None, analysis);
    IssueRepository::new(state.get_db())
        .create(issue)
        .await
        .unwrap()
}

#[tokio::test]
async fn report_with_model_down_stores_fallback_analysis() {
    let (state, _dir) = test_state(Arc::new(DownModel)).await;

    let created = report(&state, "Overflowing garbage bin near the market").await;

    assert_eq!(created.status, IssueStatus::Pending);
    assert_eq!(created.ai_analysis, Some(AiAnalysis::fallback()));

    let repo = IssueRepository::new(state.get_db());
    let all = repo.find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    let pending = repo.find_by_status(IssueStatus::Pending).await.unwrap();
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn report_with_working_model_stores_its_analysis() {
    let (state, _dir) = test_state(Arc::new(CannedModel(
        r#"{"category": "Sanitation", "severity": "High", "department": "Waste Management", "actions": ["Dispatch a cleanup crew"]}"#,
    )))
    .await;

    let created = report(&state, "Overflowing garbage bin near the market").await;

    let analysis = created.ai_analysis.unwrap();
    assert_eq!(analysis.category, "Sanitation");
    assert_eq!(analysis.severity, Severity::High);
    assert_eq!(analysis.department, "Waste Management");
}

#[tokio::test]
async fn assignment_forces_in_progress_and_sets_assigned_at_once() {
    let (state, _dir) = test_state(Arc::new(DownModel)).await;
    let repo = IssueRepository::new(state.get_db());

    let created = report(&state, "Broken streetlight").await;
    let id = created.id_string().unwrap();

    let patch = workflow::build_assignment(&created, "off-1", "A. Kumar");
    assert!(patch.set_assigned_at);
    let assigned = repo.apply_assignment(&id, &patch).await.unwrap();

    assert_eq!(assigned.status, IssueStatus::InProgress);
    assert_eq!(assigned.assigned_officer_id.as_deref(), Some("off-1"));
    let first_assigned_at = assigned.assigned_at.expect("assigned_at must be set");

    // Reassignment keeps the original timestamp
    let patch = workflow::build_assignment(&assigned, "off-2", "B. Rao");
    assert!(!patch.set_assigned_at);
    let reassigned = repo.apply_assignment(&id, &patch).await.unwrap();

    assert_eq!(reassigned.assigned_officer_id.as_deref(), Some("off-2"));
    assert_eq!(reassigned.assigned_at, Some(first_assigned_at));

    // Officer filter follows the current assignee
    let for_off2 = repo.find_by_officer("off-2").await.unwrap();
    assert_eq!(for_off2.len(), 1);
    assert!(repo.find_by_officer("off-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn resolution_is_terminal_until_reopened() {
    let (state, _dir) = test_state(Arc::new(DownModel)).await;
    let repo = IssueRepository::new(state.get_db());

    let created = report(&state, "Pothole on 5th cross").await;
    let id = created.id_string().unwrap();

    let patch = workflow::build_status_update(
        &created,
        &StatusChange {
            status: "resolved".to_string(),
            notes: Some("Filled and compacted".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let resolved = repo.apply_status_update(&id, &patch).await.unwrap();

    assert_eq!(resolved.status, IssueStatus::Resolved);
    let first_resolved_at = resolved.resolved_at.expect("resolved_at must be set");

    // Leaving Resolved without the reopen action is rejected
    let err = workflow::build_status_update(
        &resolved,
        &StatusChange {
            status: "Pending".to_string(),
            ..Default::default()
        },
    );
    assert!(err.is_err());

    // Re-resolving (notes update) is allowed and keeps the first timestamp
    let patch = workflow::build_status_update(
        &resolved,
        &StatusChange {
            status: "Resolved".to_string(),
            notes: Some("Verified after rain".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(!patch.set_resolved_at);
    let re_resolved = repo.apply_status_update(&id, &patch).await.unwrap();
    assert_eq!(re_resolved.resolved_at, Some(first_resolved_at));
    assert_eq!(re_resolved.notes.as_deref(), Some("Verified after rain"));

    // Explicit reopen leaves Resolved but keeps the historical resolved_at
    let patch = workflow::build_status_update(
        &re_resolved,
        &StatusChange {
            status: "pending".to_string(),
            reopen: true,
            ..Default::default()
        },
    )
    .unwrap();
    let reopened = repo.apply_status_update(&id, &patch).await.unwrap();
    assert_eq!(reopened.status, IssueStatus::Pending);
    assert_eq!(reopened.resolved_at, Some(first_resolved_at));
}

#[tokio::test]
async fn health_and_issue_listing_over_http() {
    let (state, _dir) = test_state(Arc::new(DownModel)).await;
    report(&state, "Fallen tree blocking the footpath").await;

    let app = api::build_app(state);

    let resp = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(Request::get("/issues").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let issues: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(issues.as_array().unwrap().len(), 1);
    assert!(
        issues[0]["maps_link"]
            .as_str()
            .unwrap()
            .starts_with("https://www.google.com/maps?q=")
    );

    // Unknown status segment is a validation error, not an empty list
    let resp = app
        .oneshot(Request::get("/issues/done").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn navigate_unknown_issue_is_404() {
    let (state, _dir) = test_state(Arc::new(DownModel)).await;
    let app = api::build_app(state);

    let resp = app
        .oneshot(
            Request::get("/navigate/issue:nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_verifies_argon2_hashes() {
    let (state, _dir) = test_state(Arc::new(DownModel)).await;

    let hash = User::hash_password("correct horse").unwrap();
    UserRepository::new(state.get_db())
        .create(User {
            id: None,
            role: "officer".to_string(),
            username: "akumar".to_string(),
            name: Some("A. Kumar".to_string()),
            hash_pass: hash,
            is_active: true,
        })
        .await
        .unwrap();

    let app = api::build_app(state);

    let login = |password: &str| {
        let body = serde_json::json!({
            "role": "officer",
            "username": "akumar",
            "password": password,
        });
        Request::post("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    };

    let resp = app.clone().oneshot(login("correct horse")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["name"], "A. Kumar");
    assert!(!json["token"].as_str().unwrap().is_empty());

    let resp = app.oneshot(login("wrong")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

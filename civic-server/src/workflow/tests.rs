use chrono::Utc;

use super::*;
use crate::db::models::{AiAnalysis, Issue};

fn pending_issue() -> Issue {
    Issue::new(
        "pothole on Main St".to_string(),
        12.97,
        77.59,
        None,
        AiAnalysis::fallback(),
    )
}

fn change(status: &str) -> StatusChange {
    StatusChange {
        status: status.to_string(),
        ..StatusChange::default()
    }
}

#[test]
fn resolve_sets_resolved_at() {
    let issue = pending_issue();
    let patch = build_status_update(&issue, &change("Resolved")).unwrap();

    assert_eq!(patch.status, IssueStatus::Resolved);
    assert!(patch.set_resolved_at);
}

#[test]
fn resolve_is_case_insensitive() {
    let issue = pending_issue();
    for spelling in ["resolved", "RESOLVED", "ReSoLvEd"] {
        let patch = build_status_update(&issue, &change(spelling)).unwrap();
        assert_eq!(patch.status, IssueStatus::Resolved);
        assert!(patch.set_resolved_at);
    }
}

#[test]
fn non_resolving_update_has_no_resolved_at() {
    let issue = pending_issue();
    let patch = build_status_update(&issue, &change("pending")).unwrap();

    assert!(!patch.set_resolved_at);
    let view = patch.response_view();
    assert!(view.get("resolved_at").is_none());
}

#[test]
fn invalid_status_is_rejected() {
    let issue = pending_issue();
    let err = build_status_update(&issue, &change("garbage")).unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidStatus(_)));
}

#[test]
fn resolved_is_terminal_without_reopen() {
    let mut issue = pending_issue();
    issue.status = IssueStatus::Resolved;
    issue.resolved_at = Some(Utc::now());

    let err = build_status_update(&issue, &change("pending")).unwrap_err();
    assert!(matches!(err, WorkflowError::Terminal));
}

#[test]
fn reopen_allows_leaving_resolved() {
    let mut issue = pending_issue();
    issue.status = IssueStatus::Resolved;
    issue.resolved_at = Some(Utc::now());

    let mut req = change("in-progress");
    req.reopen = true;
    let patch = build_status_update(&issue, &req).unwrap();
    assert_eq!(patch.status, IssueStatus::InProgress);
    assert!(!patch.set_resolved_at);
}

#[test]
fn re_resolving_keeps_original_resolved_at() {
    // Reopened issue that was resolved once before: resolved_at is write-once.
    let mut issue = pending_issue();
    issue.status = IssueStatus::InProgress;
    issue.resolved_at = Some(Utc::now());

    let patch = build_status_update(&issue, &change("Resolved")).unwrap();
    assert!(!patch.set_resolved_at);
    assert!(patch.response_view().get("resolved_at").is_none());
}

#[test]
fn updating_a_resolved_issue_in_place_is_allowed() {
    // Notes/proof on an already-resolved issue are not a transition out.
    let mut issue = pending_issue();
    issue.status = IssueStatus::Resolved;
    issue.resolved_at = Some(Utc::now());

    let mut req = change("Resolved");
    req.notes = Some("verified on site".to_string());
    let patch = build_status_update(&issue, &req).unwrap();
    assert_eq!(patch.notes, "verified on site");
    assert!(!patch.set_resolved_at);
}

#[test]
fn status_update_view_echoes_written_fields_with_marker() {
    let issue = pending_issue();
    let req = StatusChange {
        status: "Resolved".to_string(),
        notes: Some("fixed".to_string()),
        reopen: false,
        proof_image_url: None,
    };
    let view = build_status_update(&issue, &req).unwrap().response_view();

    assert_eq!(view["status"], "Resolved");
    assert_eq!(view["notes"], "fixed");
    assert_eq!(view["updated_at"], SERVER_TIMESTAMP_MARKER);
    assert_eq!(view["resolved_at"], SERVER_TIMESTAMP_MARKER);
}

#[test]
fn proof_image_lands_in_patch_and_view() {
    let issue = pending_issue();
    let req = StatusChange {
        status: "Resolved".to_string(),
        notes: None,
        reopen: false,
        proof_image_url: Some("/api/image/abc.jpg".to_string()),
    };
    let patch = build_status_update(&issue, &req).unwrap();
    assert_eq!(patch.resolved_image_url.as_deref(), Some("/api/image/abc.jpg"));
    assert_eq!(patch.response_view()["resolved_image_url"], "/api/image/abc.jpg");
}

#[test]
fn view_never_contains_a_raw_sentinel() {
    let issue = pending_issue();
    let view = build_status_update(&issue, &change("Resolved"))
        .unwrap()
        .response_view();
    for (_, value) in view.as_object().unwrap() {
        if let Some(s) = value.as_str()
            && s.contains("time::now")
        {
            panic!("raw sentinel leaked into response view: {s}");
        }
    }
}

#[test]
fn assignment_always_yields_in_progress() {
    let mut issue = pending_issue();
    for status in [
        IssueStatus::Pending,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
    ] {
        issue.status = status;
        let patch = build_assignment(&issue, "off-1", "J. Doe");
        assert_eq!(patch.status, IssueStatus::InProgress);
    }
}

#[test]
fn first_assignment_sets_assigned_at() {
    let issue = pending_issue();
    let patch = build_assignment(&issue, "off-1", "J. Doe");

    assert!(patch.set_assigned_at);
    assert_eq!(patch.officer_id, "off-1");
    assert_eq!(patch.officer_name, "J. Doe");

    let view = patch.response_view();
    assert_eq!(view["assigned_officer_id"], "off-1");
    assert_eq!(view["assigned_at"], SERVER_TIMESTAMP_MARKER);
}

#[test]
fn reassignment_keeps_original_assigned_at() {
    let mut issue = pending_issue();
    issue.assigned_officer_id = Some("off-1".to_string());
    issue.assigned_at = Some(Utc::now());

    let patch = build_assignment(&issue, "off-2", "A. Smith");
    assert!(!patch.set_assigned_at);
    assert!(patch.response_view().get("assigned_at").is_none());
}

//! Issue API 模块
//!
//! 市民上报与政府工作流接口。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub use handler::IssueView;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/report-issue", post(handler::report_issue))
        .route("/issues", get(handler::list_issues))
        .route("/issues/{status}", get(handler::list_issues_by_status))
        .route("/navigate/{issue_id}", get(handler::navigate))
        .route("/update-status/{issue_id}", post(handler::update_status))
        .route("/assign-officer/{issue_id}", post(handler::assign_officer))
        .route("/officer/issues/{officer_id}", get(handler::officer_issues))
}

//! Issue Workflow Engine
//!
//! Computes state transitions and timestamp side effects for status updates
//! and officer assignment. The engine is pure: it reads the persisted issue
//! and produces a [`StatusPatch`] / [`AssignmentPatch`] that the repository
//! applies in a single atomic `UPDATE ... MERGE` statement. Server-generated
//! timestamps ride in the patch as flags, resolved to the actual write time
//! by the storage layer; responses carry only the stable
//! [`patch::SERVER_TIMESTAMP_MARKER`] string for fields actually written.
//!
//! # State machine
//!
//! States: `Pending`, `In-Progress`, `Resolved`.
//!
//! - `update-status` parses the requested status strictly against the enum
//!   and rejects transitions out of `Resolved` unless the request carries an
//!   explicit reopen action.
//! - `assign-officer` forces `In-Progress` unconditionally.
//! - `assigned_at` and `resolved_at` are write-once: once set they are never
//!   supplied again by this layer.

pub mod patch;

#[cfg(test)]
mod tests;

use thiserror::Error;

use crate::db::models::{Issue, IssueStatus};
use crate::utils::AppError;
pub use patch::{AssignmentPatch, SERVER_TIMESTAMP_MARKER, StatusPatch};

/// Workflow errors surfaced to the HTTP layer
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Invalid status '{0}': expected Pending, In-Progress or Resolved")]
    InvalidStatus(String),

    #[error("Issue is already resolved; pass reopen to change its status")]
    Terminal,
}

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::InvalidStatus(_) => AppError::Validation(e.to_string()),
            WorkflowError::Terminal => AppError::BusinessRule(e.to_string()),
        }
    }
}

/// An incoming status-changing request
#[derive(Debug, Clone, Default)]
pub struct StatusChange {
    /// Requested status, free string from the caller
    pub status: String,
    /// Officer notes, defaults to empty
    pub notes: Option<String>,
    /// Explicit reopen action: allows leaving the `Resolved` state
    pub reopen: bool,
    /// Proof-of-resolution image, already uploaded; only the URL arrives here
    pub proof_image_url: Option<String>,
}

/// Compute the patch for a status update against the current persisted state
///
/// Always sets `status`, `notes` and `updated_at`. Sets `resolved_image_url`
/// only when a proof image was supplied, and `resolved_at` only on the first
/// transition to `Resolved`.
pub fn build_status_update(
    existing: &Issue,
    request: &StatusChange,
) -> Result<StatusPatch, WorkflowError> {
    let target = IssueStatus::parse(&request.status)
        .ok_or_else(|| WorkflowError::InvalidStatus(request.status.clone()))?;

    // Resolved is terminal. Staying in Resolved (notes, proof updates) is
    // fine, but leaving it requires the explicit reopen action.
    if existing.status == IssueStatus::Resolved && target != IssueStatus::Resolved && !request.reopen
    {
        return Err(WorkflowError::Terminal);
    }

    Ok(StatusPatch {
        status: target,
        notes: request.notes.clone().unwrap_or_default(),
        resolved_image_url: request.proof_image_url.clone(),
        set_resolved_at: target == IssueStatus::Resolved && existing.resolved_at.is_none(),
    })
}

/// Compute the patch for an officer assignment
///
/// Assignment always yields `In-Progress` regardless of prior status, acting
/// as an implicit reopen. `assigned_at` is supplied only the first time;
/// reassignment keeps the original timestamp.
pub fn build_assignment(
    existing: &Issue,
    officer_id: impl Into<String>,
    officer_name: impl Into<String>,
) -> AssignmentPatch {
    AssignmentPatch {
        officer_id: officer_id.into(),
        officer_name: officer_name.into(),
        status: IssueStatus::InProgress,
        set_assigned_at: existing.assigned_at.is_none(),
    }
}

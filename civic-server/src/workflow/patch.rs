//! Workflow patches
//!
//! A patch is the whole-document merge the repository applies atomically.
//! Server-generated timestamps are carried as `set_*` flags rather than
//! values: the storage layer resolves them to its own write time, and the
//! JSON view shown to callers replaces them with a stable marker string.

use serde_json::{Value, json};

use crate::db::models::IssueStatus;

/// Stable marker emitted in responses for fields the server timestamps.
///
/// The raw storage sentinel never leaves the repository layer.
pub const SERVER_TIMESTAMP_MARKER: &str = "SERVER_TIMESTAMP";

/// Patch produced by a status update
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPatch {
    pub status: IssueStatus,
    pub notes: String,
    /// Proof-of-resolution image URL, if one was supplied
    pub resolved_image_url: Option<String>,
    /// Whether `resolved_at` is written (first resolution only)
    pub set_resolved_at: bool,
}

impl StatusPatch {
    /// JSON-safe view of the patch for the HTTP response
    ///
    /// Contains a key per written field and nothing else: no marker (and no
    /// null) for a field the patch does not touch.
    pub fn response_view(&self) -> Value {
        let mut view = serde_json::Map::new();
        view.insert("status".to_string(), json!(self.status));
        view.insert("notes".to_string(), json!(self.notes));
        if let Some(url) = &self.resolved_image_url {
            view.insert("resolved_image_url".to_string(), json!(url));
        }
        view.insert("updated_at".to_string(), json!(SERVER_TIMESTAMP_MARKER));
        if self.set_resolved_at {
            view.insert("resolved_at".to_string(), json!(SERVER_TIMESTAMP_MARKER));
        }
        Value::Object(view)
    }
}

/// Patch produced by an officer assignment
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPatch {
    pub officer_id: String,
    pub officer_name: String,
    /// Always `In-Progress`
    pub status: IssueStatus,
    /// Whether `assigned_at` is written (first assignment only)
    pub set_assigned_at: bool,
}

impl AssignmentPatch {
    /// JSON-safe view of the patch for the HTTP response
    pub fn response_view(&self) -> Value {
        let mut view = serde_json::Map::new();
        view.insert("assigned_officer_id".to_string(), json!(self.officer_id));
        view.insert(
            "assigned_officer_name".to_string(),
            json!(self.officer_name),
        );
        view.insert("status".to_string(), json!(self.status));
        view.insert("updated_at".to_string(), json!(SERVER_TIMESTAMP_MARKER));
        if self.set_assigned_at {
            view.insert("assigned_at".to_string(), json!(SERVER_TIMESTAMP_MARKER));
        }
        Value::Object(view)
    }
}

//! Issue Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::AiAnalysis;
use super::serde_helpers;

/// Issue lifecycle status
///
/// Persisted as the canonical strings `"Pending"`, `"In-Progress"` and
/// `"Resolved"`. No other string may reach storage; caller input is parsed
/// through [`IssueStatus::parse`] at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IssueStatus {
    #[default]
    Pending,
    #[serde(rename = "In-Progress")]
    InProgress,
    Resolved,
}

impl IssueStatus {
    /// Parse a caller-supplied status string, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(IssueStatus::Pending),
            "in-progress" | "in_progress" | "inprogress" => Some(IssueStatus::InProgress),
            "resolved" => Some(IssueStatus::Resolved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "Pending",
            IssueStatus::InProgress => "In-Progress",
            IssueStatus::Resolved => "Resolved",
        }
    }
}

/// Issue report matching the SurrealDB `issue` table
///
/// Created by a citizen submission, mutated by officials, never deleted by
/// this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub description: String,
    // Decimal degrees. No bounds validation is performed (documented gap).
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_officer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_officer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_image_url: Option<String>,
    /// Set once at creation, immutable thereafter
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Write-once: supplied only at the first assignment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    /// Write-once: supplied only at the first resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Build a fresh `Pending` issue from a citizen submission
    pub fn new(
        description: String,
        latitude: f64,
        longitude: f64,
        image_url: Option<String>,
        ai_analysis: AiAnalysis,
    ) -> Self {
        Self {
            id: None,
            description,
            latitude,
            longitude,
            image_url,
            status: IssueStatus::Pending,
            ai_analysis: Some(ai_analysis),
            assigned_officer_id: None,
            assigned_officer_name: None,
            notes: None,
            resolved_image_url: None,
            created_at: Utc::now(),
            updated_at: None,
            assigned_at: None,
            resolved_at: None,
        }
    }

    /// Google Maps link derived from the stored coordinates
    pub fn maps_link(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }

    /// Record id as a "issue:xxx" string
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_canonical_and_loose_forms() {
        assert_eq!(IssueStatus::parse("Pending"), Some(IssueStatus::Pending));
        assert_eq!(IssueStatus::parse("RESOLVED"), Some(IssueStatus::Resolved));
        assert_eq!(
            IssueStatus::parse("in-progress"),
            Some(IssueStatus::InProgress)
        );
        assert_eq!(
            IssueStatus::parse("In_Progress"),
            Some(IssueStatus::InProgress)
        );
        assert_eq!(IssueStatus::parse(" resolved "), Some(IssueStatus::Resolved));
    }

    #[test]
    fn parse_rejects_anything_else() {
        assert_eq!(IssueStatus::parse("done"), None);
        assert_eq!(IssueStatus::parse(""), None);
        assert_eq!(IssueStatus::parse("Pending."), None);
    }

    #[test]
    fn status_serializes_to_canonical_strings() {
        assert_eq!(
            serde_json::to_string(&IssueStatus::InProgress).unwrap(),
            "\"In-Progress\""
        );
        assert_eq!(
            serde_json::to_string(&IssueStatus::Pending).unwrap(),
            "\"Pending\""
        );
    }
}

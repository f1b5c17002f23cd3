//! AI Analysis Model
//!
//! Normalized shape of the language model's triage output. The model is
//! allowed to answer with arbitrary text; everything here is the result of
//! coercing that text into a stable record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use surrealdb::RecordId;

use super::serde_helpers;

/// Fallback labels used when the model is unavailable or its output is unusable
pub const FALLBACK_CATEGORY: &str = "Uncategorized";
pub const FALLBACK_DEPARTMENT: &str = "General";
pub const FALLBACK_ACTION: &str = "Manual review required";

/// Issue severity as classified by the model
///
/// Out-of-enum model output coerces to `Low` rather than being persisted
/// verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a model-supplied label, case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

/// Normalized analysis record embedded into an issue (or stored standalone)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    /// Free-form short label, e.g. "Road Damage"
    pub category: String,
    pub severity: Severity,
    /// Free-form short label, e.g. "Public Works"
    pub department: String,
    /// Ordered short imperative strings
    pub actions: Vec<String>,
}

impl AiAnalysis {
    /// The canonical fallback record, used for every analysis failure path
    pub fn fallback() -> Self {
        Self {
            category: FALLBACK_CATEGORY.to_string(),
            severity: Severity::Low,
            department: FALLBACK_DEPARTMENT.to_string(),
            actions: vec![FALLBACK_ACTION.to_string()],
        }
    }

    /// Build a record from a parsed model response
    ///
    /// Fields present with the expected type pass through verbatim; missing
    /// or malformed fields take the fallback defaults field by field.
    pub fn from_model_value(value: &Value) -> Self {
        let category = value
            .get("category")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

        let severity = value
            .get("severity")
            .and_then(Value::as_str)
            .and_then(Severity::from_label)
            .unwrap_or(Severity::Low);

        let department = value
            .get("department")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_DEPARTMENT.to_string());

        let actions = value
            .get("actions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|actions| !actions.is_empty())
            .unwrap_or_else(|| vec![FALLBACK_ACTION.to_string()]);

        Self {
            category,
            severity,
            department,
            actions,
        }
    }
}

/// Standalone analysis record matching the SurrealDB `ai_analysis` table
///
/// Written by the ad hoc analysis endpoint; issues embed [`AiAnalysis`]
/// directly instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub description: String,
    #[serde(flatten)]
    pub analysis: AiAnalysis,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(description: String, analysis: AiAnalysis) -> Self {
        Self {
            id: None,
            description,
            analysis,
            created_at: Utc::now(),
        }
    }
}

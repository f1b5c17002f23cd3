//! Issue Analyzer
//!
//! Turns raw citizen text into a normalized [`AiAnalysis`] via the language
//! model. The contract is total: every failure path — transport error,
//! timeout, prose-only answer, broken JSON — collapses into the canonical
//! fallback record, so issue creation never fails because the model is
//! down.

use std::sync::Arc;

use crate::db::models::AiAnalysis;
use crate::services::llm::LanguageModel;

/// Analyzer over an injected model client
#[derive(Clone)]
pub struct IssueAnalyzer {
    model: Arc<dyn LanguageModel>,
}

impl IssueAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Analyze an issue description
    ///
    /// Single model attempt, no retry. Calling twice with identical input
    /// may yield different results; callers must not assume stability.
    pub async fn analyze(&self, description: &str) -> AiAnalysis {
        let prompt = build_prompt(description);

        let text = match self.model.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Model call failed, using fallback analysis");
                return AiAnalysis::fallback();
            }
        };

        match normalize(&text) {
            Some(analysis) => analysis,
            None => {
                tracing::warn!("Model returned no parsable JSON object, using fallback analysis");
                AiAnalysis::fallback()
            }
        }
    }
}

/// Fixed prompt template for the triage call
fn build_prompt(description: &str) -> String {
    format!(
        r#"You are an AI civic issue triage assistant.

Analyze this issue: "{description}"

Respond ONLY in JSON format with fields:
{{
  "category": "...",
  "severity": "...",
  "department": "...",
  "actions": ["...", "...", "..."]
}}

Severity must be one of:
Low, Medium, High, Critical
"#
    )
}

/// Coerce free-form model output into an analysis record
fn normalize(text: &str) -> Option<AiAnalysis> {
    let span = extract_json_object(text)?;
    let value: serde_json::Value = serde_json::from_str(span).ok()?;
    Some(AiAnalysis::from_model_value(&value))
}

/// Extract the outermost `{...}` span from the response text
///
/// The model is permitted to wrap its JSON in prose or markdown fencing;
/// first `{` to last `}` strips both.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Severity;
    use crate::db::models::analysis::{FALLBACK_ACTION, FALLBACK_CATEGORY, FALLBACK_DEPARTMENT};
    use crate::services::llm::LlmError;
    use async_trait::async_trait;

    /// Model stub returning a canned response or failure
    struct CannedModel(Result<String, ()>);

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(LlmError::Transport("connection refused".to_string())),
            }
        }
    }

    fn analyzer(response: Result<&str, ()>) -> IssueAnalyzer {
        IssueAnalyzer::new(Arc::new(CannedModel(response.map(str::to_string))))
    }

    #[tokio::test]
    async fn model_failure_yields_exact_fallback_record() {
        let result = analyzer(Err(())).analyze("pothole on Main St").await;

        assert_eq!(result.category, FALLBACK_CATEGORY);
        assert_eq!(result.severity, Severity::Low);
        assert_eq!(result.department, FALLBACK_DEPARTMENT);
        assert_eq!(result.actions, vec![FALLBACK_ACTION.to_string()]);
    }

    #[tokio::test]
    async fn well_formed_response_passes_through_verbatim() {
        let response = r#"{"category": "Road Damage", "severity": "High",
            "department": "Public Works", "actions": ["Dispatch crew", "Close lane"]}"#;
        let result = analyzer(Ok(response)).analyze("huge pothole").await;

        assert_eq!(result.category, "Road Damage");
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.department, "Public Works");
        assert_eq!(result.actions, vec!["Dispatch crew", "Close lane"]);
    }

    #[tokio::test]
    async fn json_is_extracted_from_markdown_fencing_and_prose() {
        let response = "Sure! Here is the analysis you asked for:\n```json\n\
            {\"category\": \"Lighting\", \"severity\": \"Medium\", \
             \"department\": \"Electrical\", \"actions\": [\"Replace bulb\"]}\n```\nHope it helps.";
        let result = analyzer(Ok(response)).analyze("street light out").await;

        assert_eq!(result.category, "Lighting");
        assert_eq!(result.severity, Severity::Medium);
    }

    #[tokio::test]
    async fn prose_without_json_yields_fallback() {
        let result = analyzer(Ok("I cannot help with that request."))
            .analyze("graffiti")
            .await;
        assert_eq!(result, AiAnalysis::fallback());
    }

    #[tokio::test]
    async fn broken_json_yields_fallback() {
        let result = analyzer(Ok("{\"category\": \"Road"))
            .analyze("pothole")
            .await;
        assert_eq!(result, AiAnalysis::fallback());
    }

    #[tokio::test]
    async fn missing_fields_take_defaults_field_by_field() {
        let result = analyzer(Ok(r#"{"category": "Sanitation"}"#))
            .analyze("overflowing bin")
            .await;

        assert_eq!(result.category, "Sanitation");
        assert_eq!(result.severity, Severity::Low);
        assert_eq!(result.department, FALLBACK_DEPARTMENT);
        assert_eq!(result.actions, vec![FALLBACK_ACTION.to_string()]);
    }

    #[tokio::test]
    async fn out_of_enum_severity_coerces_to_low() {
        let response = r#"{"category": "Flooding", "severity": "catastrophic",
            "department": "Drainage", "actions": ["Pump water"]}"#;
        let result = analyzer(Ok(response)).analyze("flooded street").await;
        assert_eq!(result.severity, Severity::Low);
    }

    #[tokio::test]
    async fn empty_actions_array_takes_fallback_action() {
        let response = r#"{"category": "Noise", "severity": "Low",
            "department": "Police", "actions": []}"#;
        let result = analyzer(Ok(response)).analyze("loud construction").await;
        assert_eq!(result.actions, vec![FALLBACK_ACTION.to_string()]);
    }

    #[tokio::test]
    async fn empty_description_still_terminates_with_a_record() {
        let result = analyzer(Ok("no json here")).analyze("").await;
        assert_eq!(result, AiAnalysis::fallback());
    }

    #[test]
    fn extract_spans_outermost_braces() {
        assert_eq!(
            extract_json_object("x {\"a\": {\"b\": 1}} y"),
            Some("{\"a\": {\"b\": 1}}")
        );
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }
}

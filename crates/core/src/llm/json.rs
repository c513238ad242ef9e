use crate::domain::analysis::AnalysisResult;
use crate::domain::contract::LlmAnalysisResult;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::Provider;
use anyhow::Context;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```).
        let mut inner = trimmed;
        if let Some(after_first) = inner.split_once('\n').map(|(_, rest)| rest) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

/// Parses raw model text into a validated analysis. Empty text is read as `{}`
/// and therefore fails on the first missing field.
pub fn parse_analysis(text: &str) -> anyhow::Result<AnalysisResult> {
    let text = if text.trim().is_empty() { "{}" } else { text };
    let json_str = extract_json(text).unwrap_or_else(|| text.trim().to_string());
    let parsed = serde_json::from_str::<LlmAnalysisResult>(&json_str)
        .with_context(|| format!("LLM output is not valid JSON for analysis schema: {json_str}"))?;
    parsed.validate_and_into_analysis()
}

/// `parse_analysis` for a provider reply. Failures keep the raw text so the
/// caller can log what the model actually sent.
pub fn parse_reply(provider: Provider, text: &str) -> anyhow::Result<AnalysisResult> {
    parse_analysis(text).map_err(|err| {
        anyhow::Error::new(LlmDiagnosticsError {
            provider,
            stage: "parse",
            detail: format!("{err:#}"),
            raw_output: Some(text.to_string()),
            raw_response_json: None,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{RiskLevel, Tier};
    use crate::llm::mock::valid_analysis_json;

    #[test]
    fn extract_json_handles_fenced_blocks() {
        let body = "{\"a\":1}";
        let fenced = format!("```json\n{body}\n```\n");
        assert_eq!(extract_json(&fenced), Some(body.to_string()));
    }

    #[test]
    fn extract_json_falls_back_to_braces() {
        let s = "Here you go: {\"a\":1} hope it helps";
        assert_eq!(extract_json(s), Some("{\"a\":1}".to_string()));
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn parse_analysis_accepts_valid_json() {
        let analysis = parse_analysis(&valid_analysis_json()).unwrap();
        assert_eq!(analysis.recommendations.len(), 3);
        for rec in &analysis.recommendations {
            assert!(Tier::ALL.contains(&rec.tier));
            assert!(RiskLevel::ALL.contains(&rec.risk_level));
        }
        assert_eq!(analysis.action_items.len(), 1);
    }

    #[test]
    fn parse_analysis_accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", valid_analysis_json());
        assert!(parse_analysis(&fenced).is_ok());
    }

    #[test]
    fn parse_analysis_rejects_empty_and_malformed_text() {
        assert!(parse_analysis("").is_err());
        assert!(parse_analysis("   \n").is_err());
        assert!(parse_analysis("{}").is_err());
        assert!(parse_analysis("{\"summary\": ").is_err());
        assert!(parse_analysis("I cannot help with that.").is_err());
    }

    #[test]
    fn parse_analysis_rejects_missing_field() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_analysis_json()).unwrap();
        value.as_object_mut().unwrap().remove("localContext");
        assert!(parse_analysis(&value.to_string()).is_err());
    }
}

use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl LlmDiagnosticsError {
    pub(crate) fn http(provider: Provider, status: reqwest::StatusCode, body: String) -> Self {
        let raw_response_json = serde_json::from_str::<Value>(&body).ok();
        Self {
            provider,
            stage: "http",
            detail: format!("status={status}"),
            raw_output: Some(body),
            raw_response_json,
        }
    }
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LLM error (provider={}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}

/// Raw provider output carried by `err`, when it came from an LLM client.
pub fn raw_output(err: &anyhow::Error) -> Option<&str> {
    err.downcast_ref::<LlmDiagnosticsError>()?
        .raw_output
        .as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_keeps_status_and_json_body() {
        let body = r#"{"error":{"code":503,"message":"overloaded"}}"#.to_string();
        let err = LlmDiagnosticsError::http(
            Provider::Gemini,
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body.clone(),
        );
        assert_eq!(err.stage, "http");
        assert!(err.detail.contains("503"));
        assert_eq!(err.raw_output.as_deref(), Some(body.as_str()));
        assert_eq!(
            err.raw_response_json.as_ref().unwrap()["error"]["message"],
            "overloaded"
        );
        assert!(err.to_string().contains("provider=gemini, stage=http"));
    }

    #[test]
    fn http_error_with_plain_body_has_no_json() {
        let err = LlmDiagnosticsError::http(
            Provider::Anthropic,
            reqwest::StatusCode::BAD_GATEWAY,
            "upstream down".to_string(),
        );
        assert_eq!(err.raw_output.as_deref(), Some("upstream down"));
        assert!(err.raw_response_json.is_none());
    }
}

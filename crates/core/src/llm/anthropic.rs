use crate::config::Settings;
use crate::domain::analysis::AnalysisResult;
use crate::domain::contract::LlmAnalysisResult;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::prompt::{self, SchemaDialect};
use crate::llm::{http_client, json, AnalyzeInput, LlmClient, Provider};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const DEFAULT_MAX_TOKENS: u32 = 2048;

const TOOL_NAME_EMIT_ANALYSIS: &str = "emit_rent_analysis";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let max_tokens = std::env::var("ANTHROPIC_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);
        let http = http_client("ANTHROPIC_TIMEOUT_SECS")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens,
        })
    }

    async fn create_message(&self, req: &CreateMessageRequest) -> anyhow::Result<CreateMessageResponse> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(req)
            .send()
            .await
            .context("Anthropic request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Anthropic response body")?;
        if !status.is_success() {
            return Err(LlmDiagnosticsError::http(Provider::Anthropic, status, text).into());
        }

        serde_json::from_str::<CreateMessageResponse>(&text)
            .with_context(|| format!("failed to decode Anthropic response: {text}"))
    }

    fn tools() -> Vec<Tool> {
        vec![Tool {
            name: TOOL_NAME_EMIT_ANALYSIS,
            description: "Emit the rent affordability analysis as structured JSON",
            input_schema: prompt::analysis_schema(SchemaDialect::JsonSchema),
        }]
    }

    fn tool_choice() -> ToolChoice {
        ToolChoice::Tool {
            name: TOOL_NAME_EMIT_ANALYSIS,
        }
    }

    fn request(&self, input: &AnalyzeInput) -> CreateMessageRequest {
        CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt::analysis_prompt(input),
            }],
            tools: Some(Self::tools()),
            tool_choice: Some(Self::tool_choice()),
        }
    }

    fn response_text(res: &CreateMessageResponse) -> String {
        let mut out = String::new();
        for block in &res.content {
            if let ContentBlock::Text { text } = block {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }

    fn response_tool_analysis(res: &CreateMessageResponse) -> anyhow::Result<Option<AnalysisResult>> {
        for block in &res.content {
            if let ContentBlock::ToolUse { name, input, .. } = block {
                if name == TOOL_NAME_EMIT_ANALYSIS {
                    return serde_json::from_value::<LlmAnalysisResult>(input.clone())
                        .context("failed to decode tool_use.input into LlmAnalysisResult")
                        .and_then(LlmAnalysisResult::validate_and_into_analysis)
                        .map(Some)
                        .map_err(|err| {
                            anyhow::Error::new(LlmDiagnosticsError {
                                provider: Provider::Anthropic,
                                stage: "parse",
                                detail: format!("{err:#}"),
                                raw_output: Some(input.to_string()),
                                raw_response_json: Some(input.clone()),
                            })
                        });
                }
            }
        }
        Ok(None)
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn analyze_rent(&self, input: AnalyzeInput) -> anyhow::Result<AnalysisResult> {
        let res = self.create_message(&self.request(&input)).await?;

        if matches!(res.stop_reason.as_deref(), Some("max_tokens")) {
            tracing::warn!(
                model = %self.model,
                max_tokens = self.max_tokens,
                "Anthropic stop_reason=max_tokens; reply is likely truncated"
            );
        }

        if let Some(analysis) = Self::response_tool_analysis(&res)? {
            return Ok(analysis);
        }

        // Fallback to text (should be rare with a forced tool).
        let text = Self::response_text(&res);
        json::parse_reply(Provider::Anthropic, &text)
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    name: &'static str,
    description: &'static str,
    input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
enum ToolChoice {
    #[serde(rename = "tool")]
    Tool { name: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },

    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{RiskLevel, Tier};
    use crate::llm::mock::valid_analysis_json;
    use serde_json::json;

    #[test]
    fn parses_tool_use_analysis_input() {
        let tool_input: serde_json::Value = serde_json::from_str(&valid_analysis_json()).unwrap();
        let res: CreateMessageResponse = serde_json::from_value(json!({
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "tool_use", "id": "toolu_1", "name": TOOL_NAME_EMIT_ANALYSIS, "input": tool_input},
            ],
            "stop_reason": "tool_use"
        }))
        .unwrap();

        let analysis = AnthropicClient::response_tool_analysis(&res).unwrap().unwrap();
        assert_eq!(analysis.recommendations.len(), 3);
        assert_eq!(analysis.recommendations[2].tier, Tier::Stretch);
        assert_eq!(analysis.recommendations[2].risk_level, RiskLevel::High);
    }

    #[test]
    fn invalid_tool_input_is_an_error() {
        let res = CreateMessageResponse {
            content: vec![ContentBlock::ToolUse {
                name: TOOL_NAME_EMIT_ANALYSIS.to_string(),
                input: json!({"summary": "only a summary"}),
            }],
            stop_reason: None,
        };
        let err = AnthropicClient::response_tool_analysis(&res).unwrap_err();
        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.stage, "parse");
        assert_eq!(diag.raw_response_json, Some(json!({"summary": "only a summary"})));
    }

    #[test]
    fn text_blocks_are_joined_when_no_tool_is_used() {
        let res = CreateMessageResponse {
            content: vec![
                ContentBlock::Text {
                    text: "Here is the analysis:".to_string(),
                },
                ContentBlock::Text {
                    text: valid_analysis_json(),
                },
            ],
            stop_reason: Some("end_turn".to_string()),
        };
        assert!(AnthropicClient::response_tool_analysis(&res).unwrap().is_none());
        let text = AnthropicClient::response_text(&res);
        assert!(json::parse_analysis(&text).is_ok());
    }

    #[test]
    fn request_forces_the_analysis_tool() {
        let client = AnthropicClient {
            http: reqwest::Client::new(),
            api_key: "k".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        };
        let input = AnalyzeInput {
            profile: Default::default(),
            market: "Denver, Colorado".to_string(),
        };
        let body = serde_json::to_value(client.request(&input)).unwrap();
        assert_eq!(body["tool_choice"], json!({"type": "tool", "name": TOOL_NAME_EMIT_ANALYSIS}));
        assert_eq!(body["tools"][0]["input_schema"]["type"], "object");
        assert!(body["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("Denver, Colorado"));
    }
}

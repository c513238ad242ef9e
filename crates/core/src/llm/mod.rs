pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod json;
#[cfg(test)]
pub mod mock;
pub mod prompt;

use crate::config::Settings;
use crate::domain::analysis::AnalysisResult;
use crate::domain::profile::FinancialProfile;
use anyhow::{bail, Context};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AnalyzeInput {
    pub profile: FinancialProfile,
    pub market: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Provider {
    Gemini,
    Anthropic,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("gemini"),
            Self::Anthropic => f.write_str("anthropic"),
        }
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => bail!("unknown provider: {other} (expected gemini or anthropic)"),
        }
    }
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn analyze_rent(&self, input: AnalyzeInput) -> anyhow::Result<AnalysisResult>;
}

pub fn client_from_settings(
    settings: &Settings,
    provider: Provider,
) -> anyhow::Result<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match provider {
        Provider::Gemini => Arc::new(gemini::GeminiClient::from_settings(settings)?),
        Provider::Anthropic => Arc::new(anthropic::AnthropicClient::from_settings(settings)?),
    };
    Ok(client)
}

/// Builds the shared HTTP client. Requests never time out unless `timeout_env`
/// names a variable holding a positive number of seconds.
pub(crate) fn http_client(timeout_env: &str) -> anyhow::Result<reqwest::Client> {
    let timeout_secs = std::env::var(timeout_env)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|secs| *secs > 0);

    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("failed to build reqwest client")
}

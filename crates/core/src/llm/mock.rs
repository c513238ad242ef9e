//! Scripted client for tests. Replies go through the same parsing path as the
//! real providers.

use crate::domain::analysis::AnalysisResult;
use crate::llm::{json, AnalyzeInput, LlmClient, Provider};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

pub enum MockReply {
    Text(String),
    TransportError,
}

pub struct MockClient {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockClient {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Text(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: MockReply::TransportError,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn analyze_rent(&self, _input: AnalyzeInput) -> anyhow::Result<AnalysisResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            MockReply::Text(text) => json::parse_reply(self.provider(), text),
            MockReply::TransportError => anyhow::bail!("connection refused"),
        }
    }
}

pub fn valid_analysis_json() -> String {
    json!({
        "summary": "You can comfortably afford a modest one-bedroom.",
        "recommendations": [
            {"tier": "Conservative", "percentage": 25, "amount": 1000, "riskLevel": "Low", "description": "a"},
            {"tier": "Moderate", "percentage": 30, "amount": 1200, "riskLevel": "Medium", "description": "b"},
            {"tier": "Stretch", "percentage": 35, "amount": 1400, "riskLevel": "High", "description": "c"},
        ],
        "budgetSnapshot": "After rent you keep $1,400.",
        "localContext": "Look east of I-35.",
        "actionItems": ["Build an emergency fund"],
        "followUpQuestions": ["Do you have a roommate?"],
    })
    .to_string()
}

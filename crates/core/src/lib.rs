pub mod collector;
pub mod domain;
pub mod llm;
pub mod requester;
pub mod session;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_MARKET: &str = "Austin, Texas";

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub gemini_api_key: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub llm_provider: Option<String>,
        pub market: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                gemini_api_key: non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("API_KEY")),
                anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
                llm_provider: non_empty_var("LLM_PROVIDER"),
                market: non_empty_var("RENTWISE_MARKET"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY (or API_KEY) is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn provider(&self) -> anyhow::Result<crate::llm::Provider> {
            match self.llm_provider.as_deref() {
                None => Ok(crate::llm::Provider::Gemini),
                Some(s) => s
                    .parse::<crate::llm::Provider>()
                    .with_context(|| format!("invalid LLM_PROVIDER: {s}")),
            }
        }

        pub fn market(&self) -> &str {
            self.market.as_deref().unwrap_or(DEFAULT_MARKET)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

}

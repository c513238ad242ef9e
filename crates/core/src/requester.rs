use crate::domain::analysis::Analysis;
use crate::domain::contract::{policy_drift, PolicyDrift};
use crate::domain::profile::FinancialProfile;
use crate::llm::{AnalyzeInput, LlmClient};
use anyhow::ensure;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub request_id: Uuid,
    pub profile: FinancialProfile,
    pub market: String,
}

impl AnalysisRequest {
    pub fn new(profile: FinancialProfile, market: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            profile,
            market: market.into(),
        }
    }
}

/// Runs one analysis round trip. Makes exactly one provider call when the
/// profile has income and none otherwise.
pub async fn request_analysis(
    client: &dyn LlmClient,
    request: AnalysisRequest,
) -> anyhow::Result<Analysis> {
    let AnalysisRequest {
        request_id,
        profile,
        market,
    } = request;

    ensure!(
        profile.has_income(),
        "monthly income must be greater than zero to request an analysis"
    );

    let provider = client.provider();
    tracing::info!(%request_id, %provider, %market, "requesting rent analysis");

    let result = client
        .analyze_rent(AnalyzeInput {
            profile,
            market: market.clone(),
        })
        .await?;

    for drift in policy_drift(&result, profile.monthly_income) {
        match drift {
            PolicyDrift::Percentage { tier, expected, got } => tracing::warn!(
                %request_id, %tier, expected, got,
                "recommendation percentage differs from tier policy"
            ),
            PolicyDrift::Amount { tier, expected, got } => tracing::warn!(
                %request_id, %tier, expected, got,
                "recommendation amount differs from percentage of income"
            ),
        }
    }

    tracing::info!(%request_id, "rent analysis ready");

    Ok(Analysis {
        request_id,
        generated_at: chrono::Utc::now(),
        provider,
        market,
        profile,
        result,
    })
}

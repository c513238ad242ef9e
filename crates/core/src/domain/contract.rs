use crate::domain::analysis::{AnalysisResult, RentRecommendation, RiskLevel, Tier};
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reply shape as the model emits it, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmAnalysisResult {
    pub summary: String,
    pub recommendations: Vec<LlmRentRecommendation>,
    pub budget_snapshot: String,
    pub local_context: String,
    pub action_items: Vec<String>,
    pub follow_up_questions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmRentRecommendation {
    pub tier: String,
    pub percentage: f64,
    pub amount: f64,
    pub risk_level: String,
    pub description: String,
}

/// A recommendation whose numbers disagree with the 25/30/35 policy. Reported,
/// never rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyDrift {
    Percentage {
        tier: Tier,
        expected: f64,
        got: f64,
    },
    Amount {
        tier: Tier,
        expected: f64,
        got: f64,
    },
}

impl LlmAnalysisResult {
    pub fn validate_and_into_analysis(self) -> anyhow::Result<AnalysisResult> {
        let summary = required_text(self.summary, "summary")?;
        let budget_snapshot = required_text(self.budget_snapshot, "budgetSnapshot")?;
        let local_context = required_text(self.local_context, "localContext")?;

        ensure!(
            self.recommendations.len() == 3,
            "LLM output must contain exactly 3 recommendations (got {})",
            self.recommendations.len()
        );

        let mut seen_tiers = BTreeSet::<Tier>::new();
        let mut recommendations = Vec::with_capacity(3);
        for rec in self.recommendations {
            recommendations.push(rec.validate_and_into_recommendation(&mut seen_tiers)?);
        }

        let recommendations: [RentRecommendation; 3] = recommendations
            .try_into()
            .map_err(|v: Vec<_>| anyhow::anyhow!("expected 3 recommendations, got {}", v.len()))?;

        Ok(AnalysisResult {
            summary,
            recommendations,
            budget_snapshot,
            local_context,
            action_items: non_empty_lines(self.action_items),
            follow_up_questions: non_empty_lines(self.follow_up_questions),
        })
    }
}

impl LlmRentRecommendation {
    fn validate_and_into_recommendation(
        self,
        seen_tiers: &mut BTreeSet<Tier>,
    ) -> anyhow::Result<RentRecommendation> {
        let tier: Tier = self.tier.parse()?;
        ensure!(seen_tiers.insert(tier), "duplicate tier: {tier}");

        let risk_level: RiskLevel = self
            .risk_level
            .parse()
            .with_context(|| format!("invalid riskLevel for tier {tier}"))?;

        ensure!(
            self.percentage.is_finite() && self.percentage > 0.0 && self.percentage <= 100.0,
            "percentage for tier {tier} must be in (0, 100] (got {})",
            self.percentage
        );
        ensure!(
            self.amount.is_finite() && self.amount >= 0.0,
            "amount for tier {tier} must be non-negative (got {})",
            self.amount
        );

        let description = required_text(self.description, "description")?;

        Ok(RentRecommendation {
            tier,
            percentage: self.percentage,
            amount: self.amount,
            risk_level,
            description,
        })
    }
}

/// Compares each recommendation against the tier policy and `monthly_income`.
/// Amounts within a dollar or 1% of the expected figure pass.
pub fn policy_drift(result: &AnalysisResult, monthly_income: f64) -> Vec<PolicyDrift> {
    let mut out = Vec::new();
    for rec in &result.recommendations {
        let expected_pct = rec.tier.policy_percentage();
        if (rec.percentage - expected_pct).abs() > 0.5 {
            out.push(PolicyDrift::Percentage {
                tier: rec.tier,
                expected: expected_pct,
                got: rec.percentage,
            });
        }

        let expected_amount = monthly_income * rec.percentage / 100.0;
        let tolerance = (expected_amount * 0.01).max(1.0);
        if (rec.amount - expected_amount).abs() > tolerance {
            out.push(PolicyDrift::Amount {
                tier: rec.tier,
                expected: expected_amount,
                got: rec.amount,
            });
        }
    }
    out
}

fn required_text(value: String, field: &str) -> anyhow::Result<String> {
    let trimmed = value.trim().to_string();
    ensure!(!trimmed.is_empty(), "{field} must be non-empty");
    Ok(trimmed)
}

fn non_empty_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

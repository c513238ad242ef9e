use crate::domain::profile::FinancialProfile;
use crate::llm::Provider;
use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Conservative,
    Moderate,
    Stretch,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Conservative, Tier::Moderate, Tier::Stretch];

    /// Share of take-home pay the tier is pegged to, in percent.
    pub fn policy_percentage(self) -> f64 {
        match self {
            Self::Conservative => 25.0,
            Self::Moderate => 30.0,
            Self::Stretch => 35.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Moderate => "Moderate",
            Self::Stretch => "Stretch",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let trimmed = s.trim();
        match Tier::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
        {
            Some(tier) => Ok(tier),
            None => bail!("unknown tier: {trimmed:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            Self::Low => "Safe Choice",
            Self::Medium => "Upper Limit",
            Self::High => "Not Recommended",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let trimmed = s.trim();
        match RiskLevel::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(trimmed))
        {
            Some(risk) => Ok(risk),
            None => bail!("unknown risk level: {trimmed:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentRecommendation {
    pub tier: Tier,
    pub percentage: f64,
    pub amount: f64,
    pub risk_level: RiskLevel,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub recommendations: [RentRecommendation; 3],
    pub budget_snapshot: String,
    pub local_context: String,
    pub action_items: Vec<String>,
    pub follow_up_questions: Vec<String>,
}

/// One finished analysis together with what produced it. Lives until the next
/// request starts.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub provider: Provider,
    pub market: String,
    pub profile: FinancialProfile,
    pub result: AnalysisResult,
}

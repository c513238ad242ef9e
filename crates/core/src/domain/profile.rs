use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four monthly figures a user enters. All amounts are dollars per month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    pub monthly_income: f64,
    pub monthly_debt: f64,
    pub fixed_expenses: f64,
    pub savings_goal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    MonthlyIncome,
    MonthlyDebt,
    FixedExpenses,
    SavingsGoal,
}

impl ProfileField {
    pub const ALL: [ProfileField; 4] = [
        ProfileField::MonthlyIncome,
        ProfileField::MonthlyDebt,
        ProfileField::FixedExpenses,
        ProfileField::SavingsGoal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::MonthlyIncome => "Monthly Take-Home Pay",
            Self::MonthlyDebt => "Monthly Debt (Loans/Cards)",
            Self::FixedExpenses => "Other Fixed Expenses",
            Self::SavingsGoal => "Monthly Savings Goal",
        }
    }

    /// Short command word used by the interactive front end.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::MonthlyIncome => "income",
            Self::MonthlyDebt => "debt",
            Self::FixedExpenses => "expenses",
            Self::SavingsGoal => "savings",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ProfileField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let field = match s.trim().to_ascii_lowercase().as_str() {
            "income" | "monthlyincome" | "pay" => Self::MonthlyIncome,
            "debt" | "monthlydebt" => Self::MonthlyDebt,
            "expenses" | "fixedexpenses" | "fixed" => Self::FixedExpenses,
            "savings" | "savingsgoal" | "goal" => Self::SavingsGoal,
            other => bail!("unknown profile field: {other}"),
        };
        Ok(field)
    }
}

impl FinancialProfile {
    pub fn get(&self, field: ProfileField) -> f64 {
        match field {
            ProfileField::MonthlyIncome => self.monthly_income,
            ProfileField::MonthlyDebt => self.monthly_debt,
            ProfileField::FixedExpenses => self.fixed_expenses,
            ProfileField::SavingsGoal => self.savings_goal,
        }
    }

    /// Stores `value` after coercing anything negative or non-finite to zero.
    pub fn set(&mut self, field: ProfileField, value: f64) {
        let value = sanitize_amount(value);
        match field {
            ProfileField::MonthlyIncome => self.monthly_income = value,
            ProfileField::MonthlyDebt => self.monthly_debt = value,
            ProfileField::FixedExpenses => self.fixed_expenses = value,
            ProfileField::SavingsGoal => self.savings_goal = value,
        }
    }

    pub fn has_income(&self) -> bool {
        self.monthly_income > 0.0
    }
}

/// Parses free-form amount text the way the input form does: anything that is
/// not a usable non-negative number becomes zero.
pub fn coerce_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '_') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().map(sanitize_amount).unwrap_or(0.0)
}

fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

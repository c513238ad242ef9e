use crate::domain::analysis::{RiskLevel, Tier};
use crate::llm::AnalyzeInput;
use serde_json::{json, Value};

pub const DISCLAIMER: &str = "This tool provides financial guidance, not financial advice.";

/// Which schema vocabulary the provider expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDialect {
    /// Gemini `responseSchema`: OpenAPI subset, upper-case type names.
    OpenApi,
    /// Anthropic tool `input_schema`: plain JSON Schema.
    JsonSchema,
}

impl SchemaDialect {
    fn ty(self, name: &str) -> Value {
        match self {
            Self::OpenApi => Value::String(name.to_ascii_uppercase()),
            Self::JsonSchema => Value::String(name.to_string()),
        }
    }
}

pub fn analysis_prompt(input: &AnalyzeInput) -> String {
    let p = &input.profile;
    let market = &input.market;
    let [c, m, s] = Tier::ALL.map(Tier::policy_percentage);
    format!(
        "You are Rentwise, a specialized financial assistant for first-time renters in {market}.\n\
Analyze the following monthly financial profile:\n\
- Monthly Take-home Income: ${income}\n\
- Monthly Debt (Loans/Credit): ${debt}\n\
- Fixed Expenses (Groceries/Utilities/etc): ${fixed}\n\
- Monthly Savings Goal: ${savings}\n\n\
Guidelines:\n\
1. Calculate three rent tiers:\n\
   - Conservative (Safe): {c}% of take-home pay\n\
   - Moderate (Upper Comfort): {m}% of take-home pay\n\
   - Stretch (Risky): {s}% of take-home pay\n\
2. Provide {market}-specific context (mentioning neighborhoods or local costs like utilities).\n\
3. Be protective of the user's financial health.\n\
4. Ensure the budget snapshot explains what is left over after rent + existing expenses.\n\n\
Always end with: \"{DISCLAIMER}\"",
        income = p.monthly_income,
        debt = p.monthly_debt,
        fixed = p.fixed_expenses,
        savings = p.savings_goal,
    )
}

pub fn analysis_schema(dialect: SchemaDialect) -> Value {
    let string = || json!({ "type": dialect.ty("string") });
    let number = || json!({ "type": dialect.ty("number") });
    let strings = || json!({ "type": dialect.ty("array"), "items": string() });

    let tiers: Vec<&str> = Tier::ALL.iter().map(|t| t.as_str()).collect();
    let risks: Vec<&str> = RiskLevel::ALL.iter().map(|r| r.as_str()).collect();

    let mut recommendation = json!({
        "type": dialect.ty("object"),
        "required": ["tier", "percentage", "amount", "riskLevel", "description"],
        "properties": {
            "tier": { "type": dialect.ty("string"), "enum": tiers },
            "percentage": number(),
            "amount": number(),
            "riskLevel": { "type": dialect.ty("string"), "enum": risks },
            "description": string(),
        }
    });

    let mut schema = json!({
        "type": dialect.ty("object"),
        "required": [
            "summary",
            "recommendations",
            "budgetSnapshot",
            "localContext",
            "actionItems",
            "followUpQuestions"
        ],
        "properties": {
            "summary": string(),
            "recommendations": {
                "type": dialect.ty("array"),
                "minItems": 3,
                "maxItems": 3,
                "items": Value::Null,
            },
            "budgetSnapshot": string(),
            "localContext": string(),
            "actionItems": strings(),
            "followUpQuestions": strings(),
        }
    });

    // Gemini rejects additionalProperties.
    if dialect == SchemaDialect::JsonSchema {
        recommendation["additionalProperties"] = Value::Bool(false);
        schema["additionalProperties"] = Value::Bool(false);
    }
    schema["properties"]["recommendations"]["items"] = recommendation;
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::FinancialProfile;

    fn input() -> AnalyzeInput {
        AnalyzeInput {
            profile: FinancialProfile {
                monthly_income: 4000.0,
                monthly_debt: 300.0,
                fixed_expenses: 800.0,
                savings_goal: 500.0,
            },
            market: "Austin, Texas".to_string(),
        }
    }

    #[test]
    fn prompt_embeds_figures_policy_and_market() {
        let prompt = analysis_prompt(&input());
        assert!(prompt.contains("first-time renters in Austin, Texas"));
        assert!(prompt.contains("Monthly Take-home Income: $4000"));
        assert!(prompt.contains("Monthly Debt (Loans/Credit): $300"));
        assert!(prompt.contains("Fixed Expenses (Groceries/Utilities/etc): $800"));
        assert!(prompt.contains("Monthly Savings Goal: $500"));
        assert!(prompt.contains("Conservative (Safe): 25% of take-home pay"));
        assert!(prompt.contains("Moderate (Upper Comfort): 30%"));
        assert!(prompt.contains("Stretch (Risky): 35%"));
        assert!(prompt.ends_with(&format!("\"{DISCLAIMER}\"")));
    }

    #[test]
    fn openapi_schema_uses_upper_case_types() {
        let schema = analysis_schema(SchemaDialect::OpenApi);
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["actionItems"]["items"]["type"], "STRING");
        assert!(schema.get("additionalProperties").is_none());

        let rec = &schema["properties"]["recommendations"]["items"];
        assert_eq!(rec["properties"]["amount"]["type"], "NUMBER");
        assert_eq!(rec["properties"]["tier"]["enum"], json!(["Conservative", "Moderate", "Stretch"]));
        assert_eq!(rec["properties"]["riskLevel"]["enum"], json!(["Low", "Medium", "High"]));
    }

    #[test]
    fn json_schema_requires_every_field() {
        let schema = analysis_schema(SchemaDialect::JsonSchema);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["required"].as_array().unwrap().len(), 6);
        assert_eq!(schema["properties"]["recommendations"]["minItems"], 3);
        assert_eq!(
            schema["properties"]["recommendations"]["items"]["required"]
                .as_array()
                .unwrap()
                .len(),
            5
        );
    }
}

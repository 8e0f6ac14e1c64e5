use serde::{Deserialize, Deserializer, Serialize};

use crate::api::InsightsResponse;
use crate::error::{FinsightsError, Result};

/// Aggregated credits or debits for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub total_amount: f64,
    pub transaction_count: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditDebitRatio {
    pub total_credits: f64,
    pub total_debits: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub credit_debit_ratio: CreditDebitRatio,
    pub income_pattern: String,
    pub spending_pattern: String,
    pub notable_observation: String,
    pub cash_flow_alert: String,
    pub recurring_expenses: String,
}

/// AI-generated analysis of the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsRecord {
    pub credits: Vec<CategorySummary>,
    pub debits: Vec<CategorySummary>,
    pub trends: Trends,
}

/// How often a recurring expense shows up in the statement period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Monthly,
    Quarterly,
    Occasional,
}

impl Frequency {
    pub fn from_count(transaction_count: u32) -> Self {
        match transaction_count {
            n if n >= 4 => Frequency::Monthly,
            n if n >= 2 => Frequency::Quarterly,
            _ => Frequency::Occasional,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Occasional => "Occasional",
        }
    }
}

/// Strip the inner `result` layer of the insights response.
pub fn unwrap_insights(response: InsightsResponse) -> Result<InsightsRecord> {
    let inner = match response.result {
        serde_json::Value::Object(mut outer) => outer
            .remove("result")
            .ok_or_else(|| FinsightsError::Parse("insights missing inner result".to_string()))?,
        serde_json::Value::String(message) => {
            return Err(FinsightsError::Parse(format!("no insights: {message}")));
        }
        other => {
            return Err(FinsightsError::Parse(format!(
                "unexpected insights shape: {other}"
            )));
        }
    };
    serde_json::from_value(inner)
        .map_err(|e| FinsightsError::Parse(format!("insights record: {e}")))
}

impl InsightsRecord {
    /// Debit category with the largest total.
    pub fn largest_expense(&self) -> Option<&CategorySummary> {
        self.debits
            .iter()
            .max_by(|a, b| a.total_amount.total_cmp(&b.total_amount))
    }

    /// Debits seen more than once, most frequent first.
    pub fn top_recurring_expenses(&self, limit: usize) -> Vec<&CategorySummary> {
        let mut recurring: Vec<&CategorySummary> = self
            .debits
            .iter()
            .filter(|d| d.transaction_count > 1)
            .collect();
        recurring.sort_by(|a, b| b.transaction_count.cmp(&a.transaction_count));
        recurring.truncate(limit);
        recurring
    }

    /// Totals per category, merging duplicates, in first-seen order.
    pub fn breakdown(entries: &[CategorySummary]) -> Vec<(String, f64)> {
        let mut totals: Vec<(String, f64)> = Vec::new();
        for entry in entries {
            match totals.iter_mut().find(|(c, _)| *c == entry.category) {
                Some((_, total)) => *total += entry.total_amount,
                None => totals.push((entry.category.clone(), entry.total_amount)),
            }
        }
        totals
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    /// Value of the outer `result` key as the service sends it.
    pub fn insights_body() -> Value {
        json!({
            "result": {
                "credits": [
                    {"category": "Paycheck", "description": "Direct Credit JL", "total_amount": 120.0, "transaction_count": 3, "notes": "Recurring deposits"},
                    {"category": "Transfer", "description": "Transfer from xx8727", "total_amount": 3500.0, "transaction_count": 5, "notes": ""}
                ],
                "debits": [
                    {"category": "Utilities", "description": "Alinta", "total_amount": 50.0, "transaction_count": 1, "notes": ""},
                    {"category": "Credit Card Payments", "description": "VIRGIN MONEY", "total_amount": 1000.0, "transaction_count": 1, "notes": ""},
                    {"category": "Insurance", "description": "SGIO MOT", "total_amount": 169.26, "transaction_count": 3, "notes": ""},
                    {"category": "Subscriptions", "description": "JETTS KINGSWAY", "total_amount": 167.4, "transaction_count": 6, "notes": ""},
                    {"category": "Utilities", "description": "TELSTRA", "total_amount": 345.0, "transaction_count": 2, "notes": ""},
                    {"category": "Monthly Fee", "description": "Account Fee", "total_amount": 12.0, "transaction_count": 4, "notes": ""}
                ],
                "trends": {
                    "income_pattern": "Regular income from JL.",
                    "spending_pattern": "Transfers and utilities.",
                    "notable_observation": "Consistent direct debits.",
                    "cash_flow_alert": "Large transfers to other bank.",
                    "recurring_expenses": "Telstra, gym, insurance.",
                    "credit_debit_ratio": {"total_credits": 3640.0, "total_debits": 4752.76, "ratio": 0.77}
                }
            }
        })
    }
}

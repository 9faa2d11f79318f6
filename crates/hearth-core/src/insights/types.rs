//! Core types for insight detection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::MonthKey;

/// Kinds of insights the detector can flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Month with negative profit
    LossMonth,
    /// Entity whose margin is negative
    NegativeMarginEntity,
    /// Month where expenses exceeded income
    ExpenseExceedsIncome,
    /// Single expense far above its building's monthly average
    HighExpenseOutlier,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::LossMonth => "loss_month",
            InsightKind::NegativeMarginEntity => "negative_margin_entity",
            InsightKind::ExpenseExceedsIncome => "expense_exceeds_income",
            InsightKind::HighExpenseOutlier => "high_expense_outlier",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loss_month" => Ok(InsightKind::LossMonth),
            "negative_margin_entity" => Ok(InsightKind::NegativeMarginEntity),
            "expense_exceeds_income" => Ok(InsightKind::ExpenseExceedsIncome),
            "high_expense_outlier" => Ok(InsightKind::HighExpenseOutlier),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// Severity level of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational - no action needed
    Info,
    /// Worth attention but not urgent
    Attention,
    /// Should be addressed soon
    Warning,
    /// Requires immediate attention
    Alert,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Attention => "attention",
            Severity::Warning => "warning",
            Severity::Alert => "alert",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Info => 1,
            Severity::Attention => 2,
            Severity::Warning => 3,
            Severity::Alert => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured data behind an insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InsightPayload {
    Month {
        month: MonthKey,
        income: f64,
        expense: f64,
        profit: f64,
    },
    Entity {
        entity_id: String,
        label: String,
        income: f64,
        expense: f64,
        profit: f64,
        margin: f64,
    },
    Outlier {
        record_id: String,
        date: NaiveDate,
        building_id: String,
        building_label: String,
        amount: f64,
        /// Building's average monthly expense over the full range
        monthly_average: f64,
        threshold: f64,
    },
}

/// A flagged anomaly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub severity: Severity,
    /// Short title (e.g., "Loss month")
    pub title: String,
    /// One-line summary for the alerts section
    pub summary: String,
    pub payload: InsightPayload,
}

impl Insight {
    pub fn new(
        kind: InsightKind,
        severity: Severity,
        title: impl Into<String>,
        summary: impl Into<String>,
        payload: InsightPayload,
    ) -> Self {
        Self {
            kind,
            severity,
            title: title.into(),
            summary: summary.into(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_kind_round_trip_names() {
        assert_eq!(InsightKind::LossMonth.as_str(), "loss_month");
        assert_eq!(
            InsightKind::from_str("high_expense_outlier").unwrap(),
            InsightKind::HighExpenseOutlier
        );
        assert!(InsightKind::from_str("zombie").is_err());
    }

    #[test]
    fn test_severity_priority() {
        assert!(Severity::Alert.priority() > Severity::Warning.priority());
        assert!(Severity::Warning.priority() > Severity::Attention.priority());
        assert!(Severity::Attention.priority() > Severity::Info.priority());
    }

    #[test]
    fn test_payload_serializes_tagged() {
        let payload = InsightPayload::Month {
            month: MonthKey::new(2024, 2),
            income: 50.0,
            expense: 80.0,
            profit: -30.0,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "month");
        assert_eq!(json["month"], "2024-02");
    }
}

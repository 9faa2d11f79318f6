//! Domain models for Hearth

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a transaction in the back office
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    #[default]
    Active,
    Voided,
}

impl RecordState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Voided => "voided",
        }
    }
}

impl std::str::FromStr for RecordState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "" => Ok(Self::Active),
            "voided" | "void" | "anulado" => Ok(Self::Voided),
            _ => Err(format!("Unknown record state: {}", s)),
        }
    }
}

impl std::fmt::Display for RecordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A building in the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A rentable property (unit), optionally inside a building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<BuildingRef>,
}

/// A service provider or contracted service (cleaning, plumbing, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A rental contract on a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRef {
    pub id: String,
    /// Tenant or contract label shown on statements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyRef>,
}

/// One month's rent charge on a rental
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRent {
    pub id: String,
    /// Billing period the rent covers (e.g. "2024-01")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental: Option<RentalRef>,
}

/// The payment side of an income transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RentPayment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rent: Option<MonthlyRent>,
}

/// Income or expense, with the relationships each kind can carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransactionKind {
    /// Rental payment received
    Income {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payment: Option<RentPayment>,
    },
    /// Service or maintenance expense
    Expense {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        building: Option<BuildingRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        property: Option<PropertyRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        service: Option<ServiceRef>,
    },
}

/// A financial transaction as supplied by the data-access layer
///
/// Records are read-only for the duration of one report. `amount` is always
/// the positive magnitude; the direction comes from `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub state: RecordState,
    #[serde(flatten)]
    pub kind: TransactionKind,
}

impl TransactionRecord {
    pub fn is_income(&self) -> bool {
        matches!(self.kind, TransactionKind::Income { .. })
    }

    pub fn is_expense(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense { .. })
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

// ========== Aggregation Models ==========

/// Calendar month identifier, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month immediately after this one
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month key: {}", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid month key: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month key: {}", s))?;
        if !(1..=12).contains(&month) {
            return Err(format!("Invalid month key: {}", s));
        }
        Ok(Self::new(year, month))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One calendar month of aggregated activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub month: MonthKey,
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
    pub margin: f64,
    /// Change in income vs the previous bucket, in percent
    pub income_variance_pct: Option<f64>,
    /// Change in profit vs the previous bucket, relative to |previous profit|
    pub profit_variance_pct: Option<f64>,
}

/// Aggregated totals for one grouping entity (building, property, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRollup {
    pub entity_id: String,
    pub label: String,
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
    pub margin: f64,
    pub transaction_count: usize,
}

/// Global totals over a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
    pub margin: f64,
    pub income_count: usize,
    pub expense_count: usize,
}

/// Profit margin in percent; 0 when there is no income
pub fn margin_pct(profit: f64, income: f64) -> f64 {
    if income > 0.0 {
        profit / income * 100.0
    } else {
        0.0
    }
}

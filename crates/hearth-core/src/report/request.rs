//! Report request validation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::error::{Error, Result};
use crate::models::{MonthKey, TransactionRecord};

/// Date range as received from the caller; either bound may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl ReportRequest {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Check both bounds are present and ordered
    pub fn validate(&self) -> Result<DateRange> {
        let from = self
            .from
            .ok_or_else(|| Error::Validation("missing start date (from)".into()))?;
        let to = self
            .to
            .ok_or_else(|| Error::Validation("missing end date (to)".into()))?;
        if from > to {
            return Err(Error::Validation(format!(
                "start date {} is after end date {}",
                from, to
            )));
        }
        Ok(DateRange { from, to })
    }
}

/// A validated, inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn months(&self) -> Vec<MonthKey> {
        aggregate::months_in_range(self.from, self.to)
    }

    /// Records dated inside the range, in batch order
    pub fn select<'a>(&self, records: &'a [TransactionRecord]) -> Vec<&'a TransactionRecord> {
        records.iter().filter(|r| self.contains(r.date)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parse_date;

    #[test]
    fn test_missing_dates_are_validation_errors() {
        let request = ReportRequest {
            from: Some(parse_date("2024-01-01")),
            to: None,
        };
        assert!(matches!(request.validate(), Err(Error::Validation(_))));
        assert!(matches!(
            ReportRequest::default().validate(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_reversed_range_rejected() {
        let request = ReportRequest::new(parse_date("2024-03-01"), parse_date("2024-01-01"));
        assert!(matches!(request.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_valid_range() {
        let range = ReportRequest::new(parse_date("2024-01-15"), parse_date("2024-03-01"))
            .validate()
            .unwrap();
        assert_eq!(range.months().len(), 3);
        assert!(range.contains(parse_date("2024-03-01")));
        assert!(!range.contains(parse_date("2024-01-14")));
    }

    #[test]
    fn test_request_json() {
        let request: ReportRequest = serde_json::from_str(r#"{"from": "2024-01-01"}"#).unwrap();
        assert!(request.to.is_none());
    }
}

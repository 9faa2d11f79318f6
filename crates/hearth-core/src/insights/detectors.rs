//! Anomaly detectors over aggregated results
//!
//! Each detector is a pure function of its inputs. The lists are independent:
//! a month can show up both as a loss month and as expense-exceeds-income.

use crate::aggregate::RollupTable;
use crate::attribution;
use crate::models::{EntityRollup, MonthBucket, TransactionRecord};

use super::types::{Insight, InsightKind, InsightPayload, Severity};

/// Default multiple of the monthly average that marks an expense as an outlier
pub const DEFAULT_OUTLIER_MULTIPLIER: f64 = 2.0;

/// Months whose profit is negative
pub fn detect_loss_months(series: &[MonthBucket]) -> Vec<Insight> {
    series
        .iter()
        .filter(|bucket| bucket.profit < 0.0)
        .map(|bucket| {
            Insight::new(
                InsightKind::LossMonth,
                Severity::Warning,
                "Loss month",
                format!(
                    "{} closed with a loss of {:.2}",
                    bucket.month,
                    bucket.profit.abs()
                ),
                month_payload(bucket),
            )
        })
        .collect()
}

/// Months where expenses were larger than income
pub fn detect_expense_exceeds_income(series: &[MonthBucket]) -> Vec<Insight> {
    series
        .iter()
        .filter(|bucket| bucket.expense > bucket.income)
        .map(|bucket| {
            Insight::new(
                InsightKind::ExpenseExceedsIncome,
                Severity::Attention,
                "Expenses exceed income",
                format!(
                    "{}: expenses {:.2} vs income {:.2}",
                    bucket.month, bucket.expense, bucket.income
                ),
                month_payload(bucket),
            )
        })
        .collect()
}

/// Entities whose margin is below zero
pub fn detect_negative_margin_entities(rollups: &[EntityRollup]) -> Vec<Insight> {
    rollups
        .iter()
        .filter(|rollup| rollup.margin < 0.0)
        .map(|rollup| {
            Insight::new(
                InsightKind::NegativeMarginEntity,
                Severity::Warning,
                "Negative margin",
                format!("{} has a margin of {:.1}%", rollup.label, rollup.margin),
                InsightPayload::Entity {
                    entity_id: rollup.entity_id.clone(),
                    label: rollup.label.clone(),
                    income: rollup.income,
                    expense: rollup.expense,
                    profit: rollup.profit,
                    margin: rollup.margin,
                },
            )
        })
        .collect()
}

/// Expenses above `2 ×` their building's average monthly expense
///
/// See [`detect_high_expense_outliers_with`].
pub fn detect_high_expense_outliers(
    records: &[TransactionRecord],
    building_rollups: &RollupTable,
    months_in_range: usize,
) -> Vec<Insight> {
    detect_high_expense_outliers_with(
        records,
        building_rollups,
        months_in_range,
        DEFAULT_OUTLIER_MULTIPLIER,
    )
}

/// Expenses above `multiplier ×` their building's average monthly expense
///
/// The average is the building's full-range expense total divided by
/// `max(1, months_in_range)`, so the evaluated record is part of its own
/// baseline. Evaluation is per record; several outliers may share a month.
/// Expenses without a resolvable building are skipped.
pub fn detect_high_expense_outliers_with(
    records: &[TransactionRecord],
    building_rollups: &RollupTable,
    months_in_range: usize,
    multiplier: f64,
) -> Vec<Insight> {
    let months = months_in_range.max(1) as f64;

    records
        .iter()
        .filter(|record| record.is_expense())
        .filter_map(|record| {
            let building = attribution::building_of(record)?;
            let rollup = building_rollups.get(&building.id)?;
            let average = rollup.expense / months;
            let threshold = multiplier * average;
            if record.amount <= threshold {
                return None;
            }
            Some(Insight::new(
                InsightKind::HighExpenseOutlier,
                Severity::Attention,
                "High expense",
                format!(
                    "{} on {}: {:.2} is above {:.1}x the monthly average of {:.2}",
                    rollup.label, record.date, record.amount, multiplier, average
                ),
                InsightPayload::Outlier {
                    record_id: record.id.clone(),
                    date: record.date,
                    building_id: rollup.entity_id.clone(),
                    building_label: rollup.label.clone(),
                    amount: record.amount,
                    monthly_average: average,
                    threshold,
                },
            ))
        })
        .collect()
}

fn month_payload(bucket: &MonthBucket) -> InsightPayload {
    InsightPayload::Month {
        month: bucket.month,
        income: bucket.income,
        expense: bucket.expense,
        profit: bucket.profit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{build_monthly_series, rollup_by};
    use crate::attribution::Dimension;
    use crate::test_utils::{expense, income, parse_date};

    fn scenario_b_series() -> Vec<MonthBucket> {
        let records = vec![
            income("p1", "2024-01-15", 100.0).build(),
            expense("e1", "2024-01-20", 40.0).build(),
            income("p2", "2024-02-10", 50.0).build(),
            expense("e2", "2024-02-18", 80.0).build(),
        ];
        build_monthly_series(&records, parse_date("2024-01-01"), parse_date("2024-02-29"))
    }

    #[test]
    fn test_february_is_loss_and_expense_exceeds_income() {
        let series = scenario_b_series();

        let losses = detect_loss_months(&series);
        assert_eq!(losses.len(), 1);
        assert!(matches!(
            &losses[0].payload,
            InsightPayload::Month { month, .. } if month.to_string() == "2024-02"
        ));

        let exceeds = detect_expense_exceeds_income(&series);
        assert_eq!(exceeds.len(), 1);
        assert_eq!(exceeds[0].kind, InsightKind::ExpenseExceedsIncome);
    }

    #[test]
    fn test_negative_margin_needs_income() {
        let records = vec![
            income("p1", "2024-01-05", 100.0)
                .rental("r1", "prop1", Some("b1"))
                .build(),
            expense("e1", "2024-01-07", 150.0).building("b1").build(),
            // No income: margin is 0, not negative
            expense("e2", "2024-01-07", 150.0).building("b2").build(),
        ];
        let table = rollup_by(&records, Dimension::Building);
        let flagged = detect_negative_margin_entities(table.as_slice());
        assert_eq!(flagged.len(), 1);
        assert!(matches!(
            &flagged[0].payload,
            InsightPayload::Entity { entity_id, .. } if entity_id == "b1"
        ));
    }

    #[test]
    fn test_outlier_average_includes_evaluated_record() {
        // 1100 over 2 months: average 550, threshold 1100
        let records = vec![
            expense("e1", "2024-01-10", 1000.0).building("b1").build(),
            expense("e2", "2024-02-10", 100.0).building("b1").build(),
        ];
        let table = rollup_by(&records, Dimension::Building);
        assert!(detect_high_expense_outliers(&records, &table, 2).is_empty());

        // 1300 over 2 months: average 650, threshold 1300
        let records = vec![
            expense("e1", "2024-01-10", 1200.0).building("b1").build(),
            expense("e2", "2024-02-10", 100.0).building("b1").build(),
        ];
        let table = rollup_by(&records, Dimension::Building);
        assert!(detect_high_expense_outliers(&records, &table, 2).is_empty());

        // A lone record can never exceed twice an average that contains it
        let records = vec![expense("e1", "2024-01-10", 1300.0).building("b1").build()];
        let table = rollup_by(&records, Dimension::Building);
        assert!(detect_high_expense_outliers(&records, &table, 1).is_empty());
    }

    #[test]
    fn test_outlier_flagged_over_longer_range() {
        // 3150 over 3 months: average 1050, threshold 2100
        let records = vec![
            expense("e1", "2024-01-10", 3000.0).building("b1").build(),
            expense("e2", "2024-02-10", 100.0).building("b1").build(),
            expense("e3", "2024-03-10", 50.0)
                .property("prop1", Some("b1"))
                .build(),
        ];
        let table = rollup_by(&records, Dimension::Building);
        let outliers = detect_high_expense_outliers(&records, &table, 3);
        assert_eq!(outliers.len(), 1);
        match &outliers[0].payload {
            InsightPayload::Outlier {
                record_id,
                monthly_average,
                threshold,
                ..
            } => {
                assert_eq!(record_id, "e1");
                assert!((monthly_average - 1050.0).abs() < 1e-9);
                assert!((threshold - 2100.0).abs() < 1e-9);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_outliers_are_per_record() {
        // Two large expenses in the same month; 12 month range
        let records = vec![
            expense("e1", "2024-05-01", 900.0).building("b1").build(),
            expense("e2", "2024-05-20", 800.0).building("b1").build(),
            expense("e3", "2024-06-01", 10.0).building("b1").build(),
        ];
        let table = rollup_by(&records, Dimension::Building);
        let outliers = detect_high_expense_outliers(&records, &table, 12);
        assert_eq!(outliers.len(), 2);
    }

    #[test]
    fn test_outliers_skip_unattributed_and_zero_months() {
        let records = vec![
            expense("e1", "2024-01-10", 5000.0).build(),
            expense("e2", "2024-01-10", 10.0).building("b1").build(),
        ];
        let table = rollup_by(&records, Dimension::Building);
        // months_in_range of 0 is treated as 1
        assert!(detect_high_expense_outliers(&records, &table, 0).is_empty());
    }
}

//! Insight detector - runs every detector over one report's aggregates

use tracing::debug;

use crate::aggregate::RollupTable;
use crate::models::{MonthBucket, TransactionRecord};

use super::detectors::{
    detect_expense_exceeds_income, detect_high_expense_outliers_with, detect_loss_months,
    detect_negative_margin_entities, DEFAULT_OUTLIER_MULTIPLIER,
};
use super::types::{Insight, InsightKind};

/// Aggregated inputs for insight detection
pub struct AnalysisContext<'a> {
    /// The report's transaction batch
    pub records: &'a [TransactionRecord],
    /// Monthly series for the report range
    pub series: &'a [MonthBucket],
    /// Rollup by building (used for margins and outlier baselines)
    pub buildings: &'a RollupTable,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        records: &'a [TransactionRecord],
        series: &'a [MonthBucket],
        buildings: &'a RollupTable,
    ) -> Self {
        Self {
            records,
            series,
            buildings,
        }
    }

    /// Number of calendar months the report covers
    pub fn months_in_range(&self) -> usize {
        self.series.len()
    }
}

/// Runs all detectors and orders the combined findings
#[derive(Debug, Clone)]
pub struct InsightDetector {
    outlier_multiplier: f64,
}

impl Default for InsightDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightDetector {
    pub fn new() -> Self {
        Self {
            outlier_multiplier: DEFAULT_OUTLIER_MULTIPLIER,
        }
    }

    pub fn with_outlier_multiplier(multiplier: f64) -> Self {
        Self {
            outlier_multiplier: multiplier,
        }
    }

    /// Run every detector; most severe first, detector order within a level
    pub fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mut all = vec![];
        all.extend(detect_loss_months(ctx.series));
        all.extend(detect_expense_exceeds_income(ctx.series));
        all.extend(detect_negative_margin_entities(ctx.buildings.as_slice()));
        all.extend(detect_high_expense_outliers_with(
            ctx.records,
            ctx.buildings,
            ctx.months_in_range(),
            self.outlier_multiplier,
        ));

        debug!(
            loss_months = count(&all, InsightKind::LossMonth),
            negative_margin = count(&all, InsightKind::NegativeMarginEntity),
            expense_exceeds_income = count(&all, InsightKind::ExpenseExceedsIncome),
            outliers = count(&all, InsightKind::HighExpenseOutlier),
            "Insight detection complete"
        );

        // Stable: equal severities keep detector order
        all.sort_by(|a, b| b.severity.priority().cmp(&a.severity.priority()));
        all
    }
}

fn count(insights: &[Insight], kind: InsightKind) -> usize {
    insights.iter().filter(|i| i.kind == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{build_monthly_series, rollup_by};
    use crate::attribution::Dimension;
    use crate::insights::Severity;
    use crate::test_utils::{expense, income, parse_date};

    #[test]
    fn test_analyze_orders_by_severity() {
        let records = vec![
            income("p1", "2024-01-15", 100.0)
                .rental("r1", "prop1", Some("b1"))
                .build(),
            expense("e1", "2024-01-20", 40.0).building("b1").build(),
            income("p2", "2024-02-10", 50.0)
                .rental("r1", "prop1", Some("b1"))
                .build(),
            expense("e2", "2024-02-18", 80.0).building("b1").build(),
        ];
        let series =
            build_monthly_series(&records, parse_date("2024-01-01"), parse_date("2024-02-29"));
        let buildings = rollup_by(&records, Dimension::Building);
        let ctx = AnalysisContext::new(&records, &series, &buildings);

        let insights = InsightDetector::new().analyze(&ctx);
        assert!(!insights.is_empty());
        assert_eq!(insights[0].kind, InsightKind::LossMonth);
        assert!(insights
            .windows(2)
            .all(|w| w[0].severity.priority() >= w[1].severity.priority()));
        assert!(insights
            .iter()
            .any(|i| i.kind == InsightKind::ExpenseExceedsIncome && i.severity == Severity::Attention));
    }

    #[test]
    fn test_custom_multiplier_flags_more() {
        let records = vec![
            expense("e1", "2024-01-10", 600.0).building("b1").build(),
            expense("e2", "2024-02-10", 400.0).building("b1").build(),
        ];
        let series =
            build_monthly_series(&records, parse_date("2024-01-01"), parse_date("2024-02-29"));
        let buildings = rollup_by(&records, Dimension::Building);
        let ctx = AnalysisContext::new(&records, &series, &buildings);

        // average 500: 2x threshold 1000 flags nothing, 1.1x threshold 550 flags e1
        let default = InsightDetector::new().analyze(&ctx);
        assert!(!default.iter().any(|i| i.kind == InsightKind::HighExpenseOutlier));

        let strict = InsightDetector::with_outlier_multiplier(1.1).analyze(&ctx);
        assert_eq!(
            strict
                .iter()
                .filter(|i| i.kind == InsightKind::HighExpenseOutlier)
                .count(),
            1
        );
    }
}

//! Report composition: aggregated context plus an ordered section list

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{build_monthly_series, rollup_by, totals, RollupTable};
use crate::attribution::Dimension;
use crate::config::ReportConfig;
use crate::insights::{AnalysisContext, Insight, InsightDetector};
use crate::layout::{Document, DocumentWriter, TextMeasure};
use crate::models::{MonthBucket, Totals, TransactionRecord};

use super::request::DateRange;
use super::sections::Section;

/// Which sections a report runs, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportShape {
    /// Expense listing grouped by building with running totals
    GeneralExpense,
    /// Full multi-section profit-and-loss statement
    ProfitLoss,
    /// One rental's payments and its property's expenses
    RentalStatement,
}

impl ReportShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralExpense => "general_expense",
            Self::ProfitLoss => "profit_loss",
            Self::RentalStatement => "rental_statement",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::GeneralExpense => "General Expense Report",
            Self::ProfitLoss => "Profit and Loss Statement",
            Self::RentalStatement => "Rental Statement",
        }
    }

    pub fn sections(&self) -> &'static [Section] {
        match self {
            Self::GeneralExpense => &[
                Section::Header,
                Section::ExpenseSummary,
                Section::ExpenseListing,
            ],
            Self::ProfitLoss => &[
                Section::Header,
                Section::ExecutiveSummary,
                Section::MonthlySeries,
                Section::Rankings,
                Section::CategoryBreakdown,
                Section::Insights,
            ],
            Self::RentalStatement => &[
                Section::Header,
                Section::RentalSummary,
                Section::MonthlySeries,
                Section::RentalLedger,
            ],
        }
    }
}

/// Rental the statement is about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalInfo {
    pub rental_id: String,
    pub label: String,
    pub property_id: Option<String>,
    pub property_label: Option<String>,
    pub building_label: Option<String>,
}

/// Everything the sections draw from, computed once per report
pub struct ReportContext<'a> {
    pub title: String,
    pub range: DateRange,
    /// Records whose month falls inside the range
    pub records: Vec<TransactionRecord>,
    pub series: Vec<MonthBucket>,
    pub totals: Totals,
    pub buildings: RollupTable,
    pub categories: RollupTable,
    pub insights: Vec<Insight>,
    pub rental: Option<RentalInfo>,
    pub config: &'a ReportConfig,
}

impl<'a> ReportContext<'a> {
    /// Aggregate `records` over `range`
    ///
    /// Rollups and totals use the same month window as the series, so entity
    /// sums and series sums agree.
    pub fn build(
        title: impl Into<String>,
        range: DateRange,
        records: &[TransactionRecord],
        config: &'a ReportConfig,
    ) -> Self {
        let series = build_monthly_series(records, range.from, range.to);
        let months = range.months();
        let (first, last) = (months.first().copied(), months.last().copied());
        let records: Vec<TransactionRecord> = records
            .iter()
            .filter(|r| {
                let key = r.month_key();
                first.is_some_and(|f| key >= f) && last.is_some_and(|l| key <= l)
            })
            .cloned()
            .collect();

        let totals = totals(&records);
        let buildings = rollup_by(&records, Dimension::Building);
        let categories = rollup_by(&records, Dimension::Category);
        let insights = InsightDetector::with_outlier_multiplier(config.outlier_multiplier)
            .analyze(&AnalysisContext::new(&records, &series, &buildings));

        debug!(
            records = records.len(),
            months = series.len(),
            buildings = buildings.len(),
            insights = insights.len(),
            "Report context built"
        );

        Self {
            title: title.into(),
            range,
            records,
            series,
            totals,
            buildings,
            categories,
            insights,
            rental: None,
            config,
        }
    }

    pub fn with_rental(mut self, rental: RentalInfo) -> Self {
        self.rental = Some(rental);
        self
    }

    pub fn money(&self, amount: f64) -> String {
        super::format::money(amount, &self.config.currency_symbol)
    }
}

/// Drives the layout engine through a shape's sections
pub struct ReportComposer<'a, M: TextMeasure + Clone> {
    config: &'a ReportConfig,
    measure: M,
}

impl<'a, M: TextMeasure + Clone> ReportComposer<'a, M> {
    pub fn new(config: &'a ReportConfig, measure: M) -> Self {
        Self { config, measure }
    }

    pub fn compose(&self, shape: ReportShape, ctx: &ReportContext<'_>) -> Document {
        let mut writer = DocumentWriter::new(
            ctx.title.clone(),
            self.config.page,
            self.config.typography(),
            self.config.blocks.clone(),
            self.measure.clone(),
        )
        .with_gutter(self.config.table_gutter);

        for section in shape.sections() {
            section.render(&mut writer, ctx);
        }

        let footer = writer.typography().small;
        writer.stamp_footers(&footer);
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StandardMetrics;
    use crate::test_utils::{expense, income, parse_date};

    fn range(from: &str, to: &str) -> DateRange {
        DateRange {
            from: parse_date(from),
            to: parse_date(to),
        }
    }

    #[test]
    fn test_section_orders() {
        assert_eq!(
            ReportShape::ProfitLoss.sections(),
            &[
                Section::Header,
                Section::ExecutiveSummary,
                Section::MonthlySeries,
                Section::Rankings,
                Section::CategoryBreakdown,
                Section::Insights,
            ]
        );
        assert_eq!(ReportShape::GeneralExpense.sections()[0], Section::Header);
        assert!(ReportShape::GeneralExpense
            .sections()
            .contains(&Section::ExpenseListing));
    }

    #[test]
    fn test_context_uses_series_window() {
        let config = ReportConfig::default();
        let records = vec![
            income("p1", "2024-01-03", 100.0)
                .rental("r1", "prop1", Some("b1"))
                .build(),
            expense("e1", "2024-02-20", 40.0).building("b1").build(),
            // Outside the month window
            expense("e2", "2024-04-01", 999.0).building("b1").build(),
        ];
        let ctx = ReportContext::build("t", range("2024-01-15", "2024-02-10"), &records, &config);
        assert_eq!(ctx.series.len(), 2);
        assert_eq!(ctx.records.len(), 2);
        assert_eq!(ctx.totals.expense, 40.0);
        let series_income: f64 = ctx.series.iter().map(|b| b.income).sum();
        let rollup_income: f64 = ctx.buildings.iter().map(|r| r.income).sum();
        assert_eq!(series_income, rollup_income);
    }

    #[test]
    fn test_compose_profit_loss_document() {
        let config = ReportConfig::default();
        let records = vec![
            income("p1", "2024-01-15", 100.0)
                .rental("r1", "prop1", Some("b1"))
                .build(),
            expense("e1", "2024-01-20", 40.0)
                .building("b1")
                .category("Maintenance")
                .build(),
            income("p2", "2024-02-10", 50.0)
                .rental("r1", "prop1", Some("b1"))
                .build(),
            expense("e2", "2024-02-18", 80.0)
                .building("b1")
                .category("Cleaning")
                .build(),
        ];
        let ctx = ReportContext::build(
            ReportShape::ProfitLoss.title(),
            range("2024-01-01", "2024-02-29"),
            &records,
            &config,
        );
        let doc = ReportComposer::new(&config, StandardMetrics).compose(ReportShape::ProfitLoss, &ctx);
        assert!(doc.page_count() >= 1);
        assert!(doc.contains_text("Profit and Loss Statement"));
        assert!(doc.contains_text("2024-02"));
        assert!(doc.contains_text("Maintenance"));
        assert!(doc.contains_text("Loss month"));
        assert!(doc.contains_text(&format!("Page 1 of {}", doc.page_count())));
    }
}

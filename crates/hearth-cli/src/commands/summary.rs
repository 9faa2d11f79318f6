//! Summary command: monthly series and entity rankings

use anyhow::Result;
use hearth_core::report::format::{money, percent, variance};
use hearth_core::{
    build_monthly_series, rank, rollup_by, totals, Dimension, Direction, EntityRollup,
    MonthBucket, Metric, ReportConfig, Totals,
};

use super::{load_batch, resolve_request, truncate};
use crate::cli::BatchArgs;

/// Aggregates printed by `hearth summary`
pub struct Summary {
    pub dimension: Dimension,
    pub series: Vec<MonthBucket>,
    pub totals: Totals,
    pub top: Vec<EntityRollup>,
    pub bottom: Vec<EntityRollup>,
}

impl Summary {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "dimension": self.dimension.as_str(),
            "series": self.series,
            "totals": self.totals,
            "top": self.top,
            "bottom": self.bottom,
        })
    }
}

/// Aggregate the batch into a series and a top/bottom ranking by profit
pub fn build_summary(batch: &BatchArgs, by: &str, top: usize) -> Result<Summary> {
    let dimension: Dimension = by.parse().map_err(anyhow::Error::msg)?;
    let (_, range) = resolve_request(batch)?;
    let records = load_batch(&batch.input, &range)?;

    let series = build_monthly_series(&records, range.from, range.to);
    let rollups = rollup_by(&records, dimension);

    Ok(Summary {
        dimension,
        series,
        totals: totals(&records),
        top: rank(rollups.as_slice(), Metric::Profit, Direction::Top, top),
        bottom: rank(rollups.as_slice(), Metric::Profit, Direction::Bottom, top),
    })
}

pub fn cmd_summary(
    config: &ReportConfig,
    batch: &BatchArgs,
    by: &str,
    top: usize,
    json: bool,
) -> Result<()> {
    let summary = build_summary(batch, by, top)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
        return Ok(());
    }

    let symbol = config.currency_symbol.as_str();

    println!("📊 Monthly series");
    println!();
    println!(
        "{:<8} {:>14} {:>14} {:>14} {:>8} {:>9}",
        "Month", "Income", "Expense", "Profit", "Margin", "Change"
    );
    println!("{}", "-".repeat(72));
    for bucket in &summary.series {
        println!(
            "{:<8} {:>14} {:>14} {:>14} {:>8} {:>9}",
            bucket.month.to_string(),
            money(bucket.income, symbol),
            money(bucket.expense, symbol),
            money(bucket.profit, symbol),
            percent(bucket.margin),
            variance(bucket.income_variance_pct),
        );
    }
    println!("{}", "-".repeat(72));
    println!(
        "{:<8} {:>14} {:>14} {:>14} {:>8}",
        "Total",
        money(summary.totals.income, symbol),
        money(summary.totals.expense, symbol),
        money(summary.totals.profit, symbol),
        percent(summary.totals.margin),
    );

    print_ranking(
        &format!("🏆 Top {} by profit ({})", top, summary.dimension),
        &summary.top,
        symbol,
    );
    print_ranking(
        &format!("📉 Bottom {} by profit ({})", top, summary.dimension),
        &summary.bottom,
        symbol,
    );

    Ok(())
}

fn print_ranking(heading: &str, rollups: &[EntityRollup], symbol: &str) {
    println!();
    println!("{}", heading);
    if rollups.is_empty() {
        println!("   No attributed transactions");
        return;
    }
    for (i, rollup) in rollups.iter().enumerate() {
        println!(
            "   {:>2}. {:<30} {:>14} {:>8}",
            i + 1,
            truncate(&rollup.label, 30),
            money(rollup.profit, symbol),
            percent(rollup.margin),
        );
    }
}

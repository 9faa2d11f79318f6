//! Insights command

use anyhow::Result;
use hearth_core::insights::AnalysisContext;
use hearth_core::{
    build_monthly_series, rollup_by, Dimension, Insight, InsightDetector, ReportConfig, Severity,
};

use super::{load_batch, resolve_request};
use crate::cli::BatchArgs;

/// Run every detector over the batch, most severe first
pub fn detect_insights(config: &ReportConfig, batch: &BatchArgs) -> Result<Vec<Insight>> {
    let (_, range) = resolve_request(batch)?;
    let records = load_batch(&batch.input, &range)?;

    let series = build_monthly_series(&records, range.from, range.to);
    let buildings = rollup_by(&records, Dimension::Building);
    let detector = InsightDetector::with_outlier_multiplier(config.outlier_multiplier);
    Ok(detector.analyze(&AnalysisContext::new(&records, &series, &buildings)))
}

pub fn cmd_insights(config: &ReportConfig, batch: &BatchArgs, json: bool) -> Result<()> {
    let insights = detect_insights(config, batch)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    if insights.is_empty() {
        println!("✅ No insights for this period");
        return Ok(());
    }

    println!("🔎 {} insight(s)", insights.len());
    println!();
    for insight in &insights {
        let icon = match insight.severity {
            Severity::Alert => "🔴",
            Severity::Warning => "🟠",
            Severity::Attention => "🟡",
            Severity::Info => "🔵",
        };
        println!("{} [{}] {}", icon, insight.severity, insight.title);
        println!("   {}", insight.summary);
    }

    Ok(())
}

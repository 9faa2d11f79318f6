//! Shared command utilities

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use hearth_core::report::DateRange;
use hearth_core::source;
use hearth_core::{ReportConfig, ReportRequest, TransactionRecord};
use tracing::debug;

use crate::cli::BatchArgs;

/// Load the report config from `--config`, the data-dir override, or the built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    let config = ReportConfig::load(path).context("Failed to load report config")?;
    debug!(
        page_width = config.page.width,
        page_height = config.page.height,
        "Report config loaded"
    );
    Ok(config)
}

/// Parse an optional YYYY-MM-DD argument
pub fn parse_date_arg(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid --{} date format (use YYYY-MM-DD)", flag))
        })
        .transpose()
}

/// Build and validate the report request for a batch argument group
pub fn resolve_request(batch: &BatchArgs) -> Result<(ReportRequest, DateRange)> {
    let request = ReportRequest {
        from: parse_date_arg(batch.from.as_deref(), "from")?,
        to: parse_date_arg(batch.to.as_deref(), "to")?,
    };
    let range = request.validate()?;
    Ok((request, range))
}

/// Load the batch file and keep every active record, whatever its date
pub fn load_active_batch(input: &Path) -> Result<Vec<TransactionRecord>> {
    let records = source::load_path(input)
        .with_context(|| format!("Failed to load transactions from {}", input.display()))?;
    Ok(source::active_only(records))
}

/// Load the batch file and keep the active records inside the range
pub fn load_batch(input: &Path, range: &DateRange) -> Result<Vec<TransactionRecord>> {
    let records = load_active_batch(input)?;
    Ok(source::prefilter(records, range.from, range.to))
}

//! Report command implementations

use std::path::PathBuf;

use anyhow::{Context, Result};
use hearth_core::{generate_report, RenderFormat, ReportConfig, ReportKind};

use super::{load_active_batch, resolve_request};
use crate::cli::ReportArgs;

/// Generate a report document and write it to disk, returning the written path
pub fn cmd_report(config: &ReportConfig, kind: &ReportKind, args: &ReportArgs) -> Result<PathBuf> {
    let format: RenderFormat = args.format.parse().map_err(anyhow::Error::msg)?;
    let (request, range) = resolve_request(&args.batch)?;
    // Rental lookup sees the whole batch; the report narrows to the range
    let records = load_active_batch(&args.batch.input)?;

    let output = generate_report(kind, &request, &records, config, format)
        .with_context(|| format!("Failed to generate {} report", kind.shape().as_str()))?;

    let path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&output.filename));
    std::fs::write(&path, &output.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("📄 {}", kind.shape().title());
    println!("   Period:  {} to {}", range.from, range.to);
    println!("   Records: {}", range.select(&records).len());
    println!("   Pages:   {}", output.page_count);
    println!("   Written: {} ({} bytes)", path.display(), output.bytes.len());

    Ok(path)
}

//! Report generation
//!
//! Validates the request, aggregates the batch, composes the sections for
//! the requested shape onto pages, and renders the finished document.
//!
//! ```rust,ignore
//! use hearth_core::report::{generate_profit_loss_report, ReportRequest};
//!
//! let output = generate_profit_loss_report(&ReportRequest::new(from, to), &records, &config)?;
//! std::fs::write(&output.filename, &output.bytes)?;
//! ```

pub mod composer;
pub mod filename;
pub mod format;
pub mod request;
pub mod sections;

pub use composer::{RentalInfo, ReportComposer, ReportContext, ReportShape};
pub use filename::{normalize_title, suggested_filename};
pub use request::{DateRange, ReportRequest};
pub use sections::Section;

use tracing::info;

use crate::attribution;
use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::layout::{RenderFormat, StandardMetrics};
use crate::models::{TransactionKind, TransactionRecord};

/// Which report to produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    GeneralExpense,
    ProfitLoss,
    RentalStatement { rental_id: String },
}

impl ReportKind {
    pub fn shape(&self) -> ReportShape {
        match self {
            Self::GeneralExpense => ReportShape::GeneralExpense,
            Self::ProfitLoss => ReportShape::ProfitLoss,
            Self::RentalStatement { .. } => ReportShape::RentalStatement,
        }
    }
}

/// Rendered document plus what a caller needs to offer it for download
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub page_count: usize,
}

/// Expense listing grouped by building, as a JSON page description
pub fn generate_general_expense_report(
    request: &ReportRequest,
    records: &[TransactionRecord],
    config: &ReportConfig,
) -> Result<ReportOutput> {
    generate_report(
        &ReportKind::GeneralExpense,
        request,
        records,
        config,
        RenderFormat::Json,
    )
}

/// Profit-and-loss statement, as a JSON page description
pub fn generate_profit_loss_report(
    request: &ReportRequest,
    records: &[TransactionRecord],
    config: &ReportConfig,
) -> Result<ReportOutput> {
    generate_report(&ReportKind::ProfitLoss, request, records, config, RenderFormat::Json)
}

/// Statement for one rental, as a JSON page description
pub fn generate_rental_statement(
    request: &ReportRequest,
    rental_id: &str,
    records: &[TransactionRecord],
    config: &ReportConfig,
) -> Result<ReportOutput> {
    generate_report(
        &ReportKind::RentalStatement {
            rental_id: rental_id.to_string(),
        },
        request,
        records,
        config,
        RenderFormat::Json,
    )
}

/// Generate any report kind in any output format
///
/// The request is validated before any aggregation runs. `records` is the
/// caller's batch of active records and may span any dates: a rental is
/// looked up across the whole batch, then only records dated inside the
/// range are reported.
pub fn generate_report(
    kind: &ReportKind,
    request: &ReportRequest,
    records: &[TransactionRecord],
    config: &ReportConfig,
    format: RenderFormat,
) -> Result<ReportOutput> {
    let range = request.validate()?;
    let shape = kind.shape();

    let in_range = |records: &[TransactionRecord]| -> Vec<TransactionRecord> {
        range.select(records).into_iter().cloned().collect()
    };

    let (ctx, filename_title) = match kind {
        ReportKind::GeneralExpense | ReportKind::ProfitLoss => (
            ReportContext::build(shape.title(), range, &in_range(records), config),
            shape.title().to_string(),
        ),
        ReportKind::RentalStatement { rental_id } => {
            let (rental, selected) = select_rental(rental_id, records)?;
            let filename_title = format!("{} {}", shape.title(), rental.label);
            let ctx = ReportContext::build(shape.title(), range, &in_range(&selected), config)
                .with_rental(rental);
            (ctx, filename_title)
        }
    };

    let document = ReportComposer::new(config, StandardMetrics).compose(shape, &ctx);
    let renderer = format.renderer();
    let bytes = renderer.render(&document)?;
    let filename = suggested_filename(&filename_title, &range, renderer.extension());

    info!(
        report = shape.as_str(),
        from = %range.from,
        to = %range.to,
        records = ctx.records.len(),
        pages = document.page_count(),
        bytes = bytes.len(),
        "Report generated"
    );

    Ok(ReportOutput {
        bytes,
        filename,
        content_type: renderer.content_type().to_string(),
        page_count: document.page_count(),
    })
}

/// The rental's payments and the expenses charged to its property
///
/// The rental is looked up across every record passed in, so callers must
/// hand over the batch before narrowing it to the range. A rental with no
/// payments inside the range then still gets a statement.
fn select_rental(
    rental_id: &str,
    records: &[TransactionRecord],
) -> Result<(RentalInfo, Vec<TransactionRecord>)> {
    let rental = records
        .iter()
        .filter_map(attribution::rental_of)
        .find(|rental| rental.id == rental_id)
        .ok_or_else(|| Error::NotFound(format!("rental {}", rental_id)))?;

    let property = rental.property.as_ref();
    let info = RentalInfo {
        rental_id: rental.id.clone(),
        label: rental.label.clone().unwrap_or_else(|| rental.id.clone()),
        property_id: property.map(|p| p.id.clone()),
        property_label: property.and_then(|p| p.name.clone()),
        building_label: property
            .and_then(|p| p.building.as_ref())
            .map(|b| b.name.clone().unwrap_or_else(|| b.id.clone())),
    };

    let selected = records
        .iter()
        .filter(|record| match &record.kind {
            TransactionKind::Income { .. } => {
                attribution::rental_of(record).is_some_and(|r| r.id == rental_id)
            }
            TransactionKind::Expense { .. } => info.property_id.as_deref().is_some_and(|pid| {
                attribution::property_of(record).is_some_and(|p| p.id == pid)
            }),
        })
        .cloned()
        .collect();

    Ok((info, selected))
}

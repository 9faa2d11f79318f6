//! Report handlers
//!
//! Each endpoint takes the reporting period and the transaction batch in the
//! body and answers with the rendered document as an attachment.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState};
use hearth_core::source::active_only;
use hearth_core::{generate_report, RenderFormat, ReportKind, ReportRequest, TransactionRecord};

/// Body for every report endpoint
#[derive(Debug, Deserialize)]
pub struct ReportBody {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub format: RenderFormat,
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::bad_request(&format!("Invalid {} date format (use YYYY-MM-DD)", field)))
}

fn render(state: &AppState, kind: ReportKind, body: ReportBody) -> Result<Response, AppError> {
    let request = ReportRequest {
        from: parse_date(body.from.as_deref(), "from")?,
        to: parse_date(body.to.as_deref(), "to")?,
    };
    let range = request.validate().map_err(AppError::from_report)?;

    let received = body.transactions.len();
    // Rental lookup sees the whole batch; the report narrows to the range
    let records = active_only(body.transactions);

    let output = generate_report(&kind, &request, &records, &state.reports, body.format)
        .map_err(AppError::from_report)?;

    info!(
        report = kind.shape().as_str(),
        received,
        used = range.select(&records).len(),
        pages = output.page_count,
        "Report served"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, output.content_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", output.filename),
        )
        .header("x-page-count", output.page_count.to_string())
        .body(Body::from(output.bytes))
        .map_err(|e| AppError::internal(&e.to_string()))
}

/// POST /api/reports/general-expense - Expense listing grouped by building
pub async fn general_expense_report(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReportBody>,
) -> Result<Response, AppError> {
    render(&state, ReportKind::GeneralExpense, body)
}

/// POST /api/reports/profit-loss - Profit-and-loss statement
pub async fn profit_loss_report(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReportBody>,
) -> Result<Response, AppError> {
    render(&state, ReportKind::ProfitLoss, body)
}

/// POST /api/reports/rental/:rental_id - Statement for one rental
pub async fn rental_statement(
    State(state): State<Arc<AppState>>,
    Path(rental_id): Path<String>,
    Json(body): Json<ReportBody>,
) -> Result<Response, AppError> {
    render(&state, ReportKind::RentalStatement { rental_id }, body)
}

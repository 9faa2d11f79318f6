//! Report sections
//!
//! Each section is one atomic sequence of writer calls. Sections share
//! nothing but the cursor, so any shape can run them in any order.

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::{rank, Direction, Metric};
use crate::attribution::{self, EntityKey};
use crate::layout::{Align, BlockKind, Cell, ColumnSpec, DocumentWriter, TextMeasure};
use crate::models::{EntityRollup, TransactionKind, TransactionRecord};

use super::composer::ReportContext;
use super::format;

/// Label for expenses that resolve to no building
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Title and date range
    Header,
    /// Income, expense, profit and margin totals
    ExecutiveSummary,
    /// Expense-only totals for the listing report
    ExpenseSummary,
    MonthlySeries,
    /// Top and bottom buildings by profit
    Rankings,
    CategoryBreakdown,
    Insights,
    /// Expenses grouped by building with subtotals and a running total
    ExpenseListing,
    RentalSummary,
    /// Rental transactions with a running balance
    RentalLedger,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::ExecutiveSummary => "executive_summary",
            Self::ExpenseSummary => "expense_summary",
            Self::MonthlySeries => "monthly_series",
            Self::Rankings => "rankings",
            Self::CategoryBreakdown => "category_breakdown",
            Self::Insights => "insights",
            Self::ExpenseListing => "expense_listing",
            Self::RentalSummary => "rental_summary",
            Self::RentalLedger => "rental_ledger",
        }
    }

    pub fn render<M: TextMeasure>(&self, w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
        match self {
            Self::Header => header(w, ctx),
            Self::ExecutiveSummary => executive_summary(w, ctx),
            Self::ExpenseSummary => expense_summary(w, ctx),
            Self::MonthlySeries => monthly_series(w, ctx),
            Self::Rankings => rankings(w, ctx),
            Self::CategoryBreakdown => category_breakdown(w, ctx),
            Self::Insights => insights(w, ctx),
            Self::ExpenseListing => expense_listing(w, ctx),
            Self::RentalSummary => rental_summary(w, ctx),
            Self::RentalLedger => rental_ledger(w, ctx),
        }
    }
}

/// Section heading kept on the same page as the start of `next`
fn heading<M: TextMeasure>(w: &mut DocumentWriter<M>, text: &str, next: BlockKind) {
    let needed = w.required_height(BlockKind::SectionHeading) + w.required_height(next);
    w.ensure_space(needed);
    let style = w.typography().heading;
    if !w.cursor().is_at_top() {
        w.write_spacer(style.line_height * 0.5);
    }
    w.write_line(text, &style);
}

fn note<M: TextMeasure>(w: &mut DocumentWriter<M>, text: &str) {
    let body = w.typography().body;
    let width = w.content_width();
    w.write_wrapped_text(text, width, &body);
}

fn header<M: TextMeasure>(w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
    let t = *w.typography();
    w.write_line(&ctx.title, &t.title);
    if let Some(rental) = &ctx.rental {
        w.write_line(&rental.label, &t.heading);
    }
    w.write_line(
        &format!(
            "Period: {} to {}",
            format::date(ctx.range.from),
            format::date(ctx.range.to)
        ),
        &t.body,
    );
    w.write_rule();
}

fn executive_summary<M: TextMeasure>(w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
    heading(w, "Summary", BlockKind::Summary);
    let totals = &ctx.totals;
    let pairs = vec![
        ("Income".to_string(), ctx.money(totals.income)),
        ("Expenses".to_string(), ctx.money(totals.expense)),
        ("Net profit".to_string(), ctx.money(totals.profit)),
        ("Margin".to_string(), format::percent(totals.margin)),
        ("Payments".to_string(), totals.income_count.to_string()),
        ("Expense transactions".to_string(), totals.expense_count.to_string()),
    ];
    w.write_key_values(&pairs);
}

fn expense_summary<M: TextMeasure>(w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
    heading(w, "Summary", BlockKind::Summary);
    let unassigned: f64 = ctx
        .records
        .iter()
        .filter(|r| r.is_expense() && attribution::building_of(r).is_none())
        .map(|r| r.amount)
        .sum();
    let buildings = ctx.buildings.iter().filter(|r| r.expense > 0.0).count();
    let pairs = vec![
        ("Total expenses".to_string(), ctx.money(ctx.totals.expense)),
        ("Expense transactions".to_string(), ctx.totals.expense_count.to_string()),
        ("Buildings".to_string(), buildings.to_string()),
        ("Unassigned expenses".to_string(), ctx.money(unassigned)),
    ];
    w.write_key_values(&pairs);
}

fn monthly_series<M: TextMeasure>(w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
    heading(w, "Monthly results", BlockKind::TableHeader);
    let columns = w.fit_columns(&[
        (1.0, Align::Left),
        (1.4, Align::Right),
        (1.4, Align::Right),
        (1.4, Align::Right),
        (1.0, Align::Right),
        (1.0, Align::Right),
        (1.0, Align::Right),
    ]);
    let mut rows: Vec<Vec<Cell>> = ctx
        .series
        .iter()
        .map(|bucket| {
            vec![
                Cell::text(bucket.month.to_string()),
                Cell::text(ctx.money(bucket.income)),
                Cell::text(ctx.money(bucket.expense)),
                Cell::text(ctx.money(bucket.profit)),
                Cell::text(format::percent(bucket.margin)),
                Cell::text(format::variance(bucket.income_variance_pct)),
                Cell::text(format::variance(bucket.profit_variance_pct)),
            ]
        })
        .collect();

    let income: f64 = ctx.series.iter().map(|b| b.income).sum();
    let expense: f64 = ctx.series.iter().map(|b| b.expense).sum();
    let profit = income - expense;
    rows.push(vec![
        Cell::text("Total"),
        Cell::text(ctx.money(income)),
        Cell::text(ctx.money(expense)),
        Cell::text(ctx.money(profit)),
        Cell::text(format::percent(crate::models::margin_pct(profit, income))),
    ]);

    w.write_table(
        &["Month", "Income", "Expenses", "Profit", "Margin", "Income chg", "Profit chg"],
        &rows,
        &columns,
    );
}

fn ranking_table<M: TextMeasure>(
    w: &mut DocumentWriter<M>,
    ctx: &ReportContext<'_>,
    rollups: &[EntityRollup],
) {
    let columns = w.fit_columns(&[
        (0.4, Align::Right),
        (2.4, Align::Left),
        (1.3, Align::Right),
        (1.3, Align::Right),
        (1.3, Align::Right),
        (0.9, Align::Right),
    ]);
    let rows: Vec<Vec<Cell>> = rollups
        .iter()
        .enumerate()
        .map(|(i, rollup)| {
            vec![
                Cell::text((i + 1).to_string()),
                Cell::wrapped(rollup.label.clone()),
                Cell::text(ctx.money(rollup.income)),
                Cell::text(ctx.money(rollup.expense)),
                Cell::text(ctx.money(rollup.profit)),
                Cell::text(format::percent(rollup.margin)),
            ]
        })
        .collect();
    w.write_table(
        &["#", "Building", "Income", "Expenses", "Profit", "Margin"],
        &rows,
        &columns,
    );
}

fn rankings<M: TextMeasure>(w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
    let n = ctx.config.ranking_size;
    heading(w, "Top buildings by profit", BlockKind::Ranking);
    if ctx.buildings.is_empty() {
        note(w, "No transactions could be attributed to a building.");
        return;
    }
    let top = rank(ctx.buildings.as_slice(), Metric::Profit, Direction::Top, n);
    ranking_table(w, ctx, &top);

    heading(w, "Bottom buildings by profit", BlockKind::Ranking);
    let bottom = rank(ctx.buildings.as_slice(), Metric::Profit, Direction::Bottom, n);
    ranking_table(w, ctx, &bottom);
}

fn category_breakdown<M: TextMeasure>(w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
    heading(w, "By category", BlockKind::TableHeader);
    if ctx.categories.is_empty() {
        note(w, "No transactions in this period.");
        return;
    }
    let columns = w.fit_columns(&[
        (2.4, Align::Left),
        (1.3, Align::Right),
        (1.3, Align::Right),
        (1.3, Align::Right),
        (0.7, Align::Right),
    ]);
    let ordered = rank(
        ctx.categories.as_slice(),
        Metric::Expense,
        Direction::Top,
        ctx.categories.len(),
    );
    let rows: Vec<Vec<Cell>> = ordered
        .iter()
        .map(|rollup| {
            vec![
                Cell::wrapped(rollup.label.clone()),
                Cell::text(ctx.money(rollup.income)),
                Cell::text(ctx.money(rollup.expense)),
                Cell::text(ctx.money(rollup.profit)),
                Cell::text(rollup.transaction_count.to_string()),
            ]
        })
        .collect();
    w.write_table(&["Category", "Income", "Expenses", "Net", "Count"], &rows, &columns);
}

fn insights<M: TextMeasure>(w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
    heading(w, "Insights", BlockKind::Insight);
    if ctx.insights.is_empty() {
        note(w, "No anomalies detected.");
        return;
    }
    let body = w.typography().body;
    let width = w.content_width();
    for insight in &ctx.insights {
        w.ensure_block(BlockKind::Insight);
        w.write_line(
            &format!(
                "[{}] {}",
                insight.severity.as_str().to_uppercase(),
                insight.title
            ),
            &body.emphasized(),
        );
        w.write_wrapped_text(&insight.summary, width, &body);
    }
}

/// Expenses grouped by building in first-appearance order, unassigned last
fn group_expenses(records: &[TransactionRecord]) -> Vec<(String, Vec<&TransactionRecord>)> {
    let mut groups: Vec<(String, Vec<&TransactionRecord>)> = vec![];
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unassigned = vec![];

    for record in records.iter().filter(|r| r.is_expense()) {
        match attribution::resolve(record, attribution::Dimension::Building) {
            Some(EntityKey { id, label }) => {
                let i = *index.entry(id).or_insert_with(|| {
                    groups.push((label, vec![]));
                    groups.len() - 1
                });
                groups[i].1.push(record);
            }
            None => unassigned.push(record),
        }
    }
    if !unassigned.is_empty() {
        groups.push((UNASSIGNED.to_string(), unassigned));
    }
    for (_, records) in groups.iter_mut() {
        records.sort_by_key(|r| r.date);
    }
    groups
}

fn expense_description(record: &TransactionRecord) -> String {
    let service = match &record.kind {
        TransactionKind::Expense {
            service: Some(service),
            ..
        } => service.name.clone(),
        _ => None,
    };
    record
        .description
        .clone()
        .or(service)
        .unwrap_or_else(|| "-".to_string())
}

fn expense_listing<M: TextMeasure>(w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
    heading(w, "Expenses by building", BlockKind::GroupHeader);
    let groups = group_expenses(&ctx.records);
    if groups.is_empty() {
        note(w, "No expenses in this period.");
        return;
    }

    let t = *w.typography();
    let columns: Vec<ColumnSpec> = w.fit_columns(&[
        (1.0, Align::Left),
        (1.2, Align::Left),
        (2.8, Align::Left),
        (1.2, Align::Right),
        (1.3, Align::Right),
    ]);
    let mut running = 0.0;

    for (label, records) in &groups {
        let needed =
            w.required_height(BlockKind::GroupHeader) + w.required_height(BlockKind::TableHeader);
        w.ensure_space(needed);
        w.write_line(label, &t.heading);

        let mut subtotal = 0.0;
        let rows: Vec<Vec<Cell>> = records
            .iter()
            .map(|record| {
                subtotal += record.amount;
                running += record.amount;
                vec![
                    Cell::text(format::date(record.date)),
                    Cell::text(record.category.clone().unwrap_or_else(|| "-".to_string())),
                    Cell::wrapped(expense_description(record)),
                    Cell::text(ctx.money(record.amount)),
                    Cell::text(ctx.money(running)),
                ]
            })
            .collect();
        w.write_table(
            &["Date", "Category", "Description", "Amount", "Running total"],
            &rows,
            &columns,
        );
        w.write_line_pair(
            &format!("Subtotal {}", label),
            &ctx.money(subtotal),
            &t.body.emphasized(),
        );
        w.write_spacer(t.body.line_height * 0.5);
    }

    w.write_rule();
    w.write_line_pair("Grand total", &ctx.money(running), &t.heading);
}

fn rental_summary<M: TextMeasure>(w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
    heading(w, "Rental", BlockKind::Summary);
    let Some(rental) = &ctx.rental else {
        note(w, "No rental selected.");
        return;
    };
    let dash = || "-".to_string();
    let totals = &ctx.totals;
    let pairs = vec![
        ("Rental".to_string(), rental.label.clone()),
        (
            "Property".to_string(),
            rental
                .property_label
                .clone()
                .or_else(|| rental.property_id.clone())
                .unwrap_or_else(dash),
        ),
        (
            "Building".to_string(),
            rental.building_label.clone().unwrap_or_else(dash),
        ),
        ("Payments received".to_string(), ctx.money(totals.income)),
        ("Payments".to_string(), totals.income_count.to_string()),
        ("Property expenses".to_string(), ctx.money(totals.expense)),
        ("Net".to_string(), ctx.money(totals.profit)),
    ];
    w.write_key_values(&pairs);
}

fn ledger_description(record: &TransactionRecord) -> String {
    match &record.kind {
        TransactionKind::Income { payment } => {
            let period = payment
                .as_ref()
                .and_then(|p| p.monthly_rent.as_ref())
                .and_then(|rent| rent.period.clone());
            match (period, &record.description) {
                (Some(period), _) => format!("Rent {}", period),
                (None, Some(description)) => description.clone(),
                (None, None) => "Rent payment".to_string(),
            }
        }
        TransactionKind::Expense { .. } => expense_description(record),
    }
}

fn rental_ledger<M: TextMeasure>(w: &mut DocumentWriter<M>, ctx: &ReportContext<'_>) {
    heading(w, "Ledger", BlockKind::TableHeader);
    if ctx.records.is_empty() {
        note(w, "No transactions in this period.");
        return;
    }

    let mut ordered: Vec<&TransactionRecord> = ctx.records.iter().collect();
    ordered.sort_by_key(|r| r.date);

    let columns = w.fit_columns(&[
        (1.0, Align::Left),
        (0.9, Align::Left),
        (3.0, Align::Left),
        (1.2, Align::Right),
        (1.2, Align::Right),
    ]);
    let mut balance = 0.0;
    let rows: Vec<Vec<Cell>> = ordered
        .iter()
        .map(|record| {
            let signed = if record.is_income() {
                record.amount
            } else {
                -record.amount
            };
            balance += signed;
            vec![
                Cell::text(format::date(record.date)),
                Cell::text(if record.is_income() { "Payment" } else { "Expense" }),
                Cell::wrapped(ledger_description(record)),
                Cell::text(ctx.money(signed)),
                Cell::text(ctx.money(balance)),
            ]
        })
        .collect();
    w.write_table(&["Date", "Type", "Description", "Amount", "Balance"], &rows, &columns);

    let t = *w.typography();
    w.write_rule();
    w.write_line_pair("Closing balance", &ctx.money(balance), &t.heading);
}

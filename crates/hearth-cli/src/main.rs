//! Hearth CLI - Property-management financial reports
//!
//! Usage:
//!   hearth report profit-loss --input batch.csv --from 2024-01-01 --to 2024-03-31
//!   hearth report expenses --input batch.json --from ... --to ... --format text
//!   hearth summary --input batch.csv --from ... --to ... --by building
//!   hearth serve --port 3000    Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use hearth_core::ReportKind;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Report { report_type } => {
            let (kind, args) = match report_type {
                ReportType::Expenses { args } => (ReportKind::GeneralExpense, args),
                ReportType::ProfitLoss { args } => (ReportKind::ProfitLoss, args),
                ReportType::Rental { rental, args } => {
                    (ReportKind::RentalStatement { rental_id: rental }, args)
                }
            };
            commands::cmd_report(&config, &kind, &args).map(|_| ())
        }
        Commands::Summary {
            batch,
            by,
            top,
            json,
        } => commands::cmd_summary(&config, &batch, &by, top, json),
        Commands::Insights { batch, json } => commands::cmd_insights(&config, &batch, json),
        Commands::Serve { port, host } => commands::cmd_serve(config, &host, port).await,
    }
}

//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Hearth - Financial reports for property management
#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Income, expense and profit reports for rental properties", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Report layout config (defaults to the data-dir override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a report document
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Print the monthly series and entity rankings
    Summary {
        #[command(flatten)]
        batch: BatchArgs,

        /// Rollup dimension: building, property, service, rental, category
        #[arg(long, default_value = "building")]
        by: String,

        /// Entries per ranking
        #[arg(long, default_value = "5")]
        top: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print detected insights (loss months, negative margins, outliers)
    Insights {
        #[command(flatten)]
        batch: BatchArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

/// Transaction batch and reporting period
#[derive(Args, Clone, Debug)]
pub struct BatchArgs {
    /// Transaction batch file (.json or .csv)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

/// Options shared by every report document
#[derive(Args, Clone, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Output file (defaults to the suggested filename in the current directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output format: json (page description) or text (preview)
    #[arg(long, default_value = "json")]
    pub format: String,
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Expense listing grouped by building
    Expenses {
        #[command(flatten)]
        args: ReportArgs,
    },

    /// Profit-and-loss statement with rankings and insights
    ProfitLoss {
        #[command(flatten)]
        args: ReportArgs,
    },

    /// Statement for a single rental
    Rental {
        /// Rental id
        #[arg(long)]
        rental: String,

        #[command(flatten)]
        args: ReportArgs,
    },
}

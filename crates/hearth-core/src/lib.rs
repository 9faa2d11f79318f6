//! Hearth Core Library
//!
//! Financial reporting for a property-management back office:
//! - Monthly series, entity rollups and rankings over transaction batches
//! - Building attribution through the payment and property chains
//! - Insight detection (loss months, negative margins, expense outliers)
//! - A paginated layout engine with wrapping, truncation and tables
//! - Report composition for expense, profit-and-loss and rental statements
//! - JSON/CSV batch loaders and TOML layout configuration

pub mod aggregate;
pub mod attribution;
pub mod config;
pub mod error;
pub mod insights;
pub mod layout;
pub mod models;
pub mod report;
pub mod source;

/// Test utilities: record builders and a fixed-width text measurer
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{
    build_entity_rollup, build_monthly_series, rank, rollup_by, totals, Direction, Metric,
    RollupTable,
};
pub use attribution::{Dimension, EntityKey};
pub use config::ReportConfig;
pub use error::{Error, Result};
pub use insights::{Insight, InsightDetector, InsightKind, Severity};
pub use layout::{Document, DocumentWriter, RenderFormat};
pub use models::{
    EntityRollup, MonthBucket, MonthKey, RecordState, Totals, TransactionKind, TransactionRecord,
};
pub use report::{
    generate_general_expense_report, generate_profit_loss_report, generate_rental_statement,
    generate_report, ReportKind, ReportOutput, ReportRequest, ReportShape,
};

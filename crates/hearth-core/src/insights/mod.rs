//! Insight detection - flags anomalies in a report's aggregates
//!
//! ## Insight Kinds
//!
//! - **Loss month** - a month with negative profit
//! - **Expense exceeds income** - a month where expenses beat income
//! - **Negative margin entity** - a building losing money over the range
//! - **High expense outlier** - a single expense above a multiple of its
//!   building's average monthly expense
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hearth_core::insights::{AnalysisContext, InsightDetector};
//!
//! let ctx = AnalysisContext::new(&records, &series, &buildings);
//! let insights = InsightDetector::new().analyze(&ctx);
//! ```

pub mod detectors;
pub mod engine;
pub mod types;

pub use detectors::{
    detect_expense_exceeds_income, detect_high_expense_outliers,
    detect_high_expense_outliers_with, detect_loss_months, detect_negative_margin_entities,
    DEFAULT_OUTLIER_MULTIPLIER,
};
pub use engine::{AnalysisContext, InsightDetector};
pub use types::{Insight, InsightKind, InsightPayload, Severity};

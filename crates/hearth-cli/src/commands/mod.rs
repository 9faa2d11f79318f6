//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `common` - Shared utilities (config loading, date arguments, batch loading)
//! - `insights` - Insight listing
//! - `reports` - Report document generation
//! - `serve` - Web server command
//! - `summary` - Monthly series and rankings

pub mod common;
pub mod insights;
pub mod reports;
pub mod serve;
pub mod summary;

// Re-export command functions for main.rs
pub use common::*;
pub use insights::*;
pub use reports::*;
pub use serve::*;
pub use summary::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

//! Display formatting for amounts, percentages and dates
//!
//! The only place values are rounded. Amounts always use the en locale
//! (`1,234.50`) whatever the currency symbol.

use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString as _};

/// Money with a currency symbol, thousands separators and two decimals
///
/// Negative amounts put the sign before the symbol: `-$1,234.50`.
pub fn money(amount: f64, symbol: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as i64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{}{}.{:02}",
        sign,
        symbol,
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// Percentage with one decimal: `12.5%`
pub fn percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    // Avoid "-0.0%"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.1}%", rounded)
}

/// Signed period-over-period change, or a dash when it is undefined
pub fn variance(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format!("+{}", percent(v)),
        Some(v) => percent(v),
        None => "-".to_string(),
    }
}

pub fn date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

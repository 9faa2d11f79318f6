//! Financial aggregation over a transaction batch
//!
//! Builds the contiguous monthly series, per-entity rollups, global totals,
//! and rankings used by every report. All sums keep full `f64` precision;
//! rounding happens only when a value is rendered.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attribution::{self, Dimension, EntityKey};
use crate::models::{margin_pct, EntityRollup, MonthBucket, MonthKey, Totals, TransactionRecord};

/// Calendar months spanning `[from, to]`, ascending; empty when `from > to`
pub fn months_in_range(from: NaiveDate, to: NaiveDate) -> Vec<MonthKey> {
    if from > to {
        return vec![];
    }
    let last = MonthKey::from_date(to);
    let mut current = MonthKey::from_date(from);
    let mut months = vec![];
    while current <= last {
        months.push(current);
        current = current.succ();
    }
    months
}

/// Build one bucket per calendar month in `[from, to]`, including empty months
///
/// Records dated in a month outside the range are ignored. A reversed range
/// yields an empty series rather than an error.
pub fn build_monthly_series(
    records: &[TransactionRecord],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<MonthBucket> {
    let months = months_in_range(from, to);
    let index: HashMap<MonthKey, usize> = months
        .iter()
        .enumerate()
        .map(|(i, month)| (*month, i))
        .collect();

    let mut sums = vec![(0.0_f64, 0.0_f64); months.len()];
    let mut outside = 0usize;
    for record in records {
        let Some(&i) = index.get(&record.month_key()) else {
            outside += 1;
            continue;
        };
        if record.is_income() {
            sums[i].0 += record.amount;
        } else {
            sums[i].1 += record.amount;
        }
    }

    let mut buckets: Vec<MonthBucket> = months
        .into_iter()
        .zip(sums)
        .map(|(month, (income, expense))| {
            let profit = income - expense;
            MonthBucket {
                month,
                income,
                expense,
                profit,
                margin: margin_pct(profit, income),
                income_variance_pct: None,
                profit_variance_pct: None,
            }
        })
        .collect();

    apply_variances(&mut buckets);

    debug!(
        months = buckets.len(),
        records = records.len(),
        outside_range = outside,
        "Built monthly series"
    );
    buckets
}

/// Fill month-over-month variance fields; the first bucket stays `None`
fn apply_variances(buckets: &mut [MonthBucket]) {
    for i in 1..buckets.len() {
        let prev_income = buckets[i - 1].income;
        let prev_profit = buckets[i - 1].profit;
        let current = &mut buckets[i];

        current.income_variance_pct = if prev_income > 0.0 {
            Some((current.income - prev_income) / prev_income * 100.0)
        } else {
            None
        };

        let profit_base = prev_profit.abs();
        current.profit_variance_pct = if profit_base > 0.0 {
            Some((current.profit - prev_profit) / profit_base * 100.0)
        } else {
            None
        };
    }
}

/// Global totals over every record in the batch
pub fn totals(records: &[TransactionRecord]) -> Totals {
    let mut totals = Totals::default();
    for record in records {
        if record.is_income() {
            totals.income += record.amount;
            totals.income_count += 1;
        } else {
            totals.expense += record.amount;
            totals.expense_count += 1;
        }
    }
    totals.profit = totals.income - totals.expense;
    totals.margin = margin_pct(totals.profit, totals.income);
    totals
}

/// Rollups keyed by entity id, in order of first appearance in the batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct RollupTable {
    rows: Vec<EntityRollup>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl RollupTable {
    pub fn get(&self, entity_id: &str) -> Option<&EntityRollup> {
        self.index.get(entity_id).map(|&i| &self.rows[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRollup> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[EntityRollup] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn entry(&mut self, key: EntityKey) -> &mut EntityRollup {
        let next = self.rows.len();
        let i = *self.index.entry(key.id.clone()).or_insert(next);
        if i == next {
            self.rows.push(EntityRollup {
                entity_id: key.id,
                label: key.label,
                income: 0.0,
                expense: 0.0,
                profit: 0.0,
                margin: 0.0,
                transaction_count: 0,
            });
        }
        &mut self.rows[i]
    }
}

/// Group records by `key_fn` and total each group
///
/// Records for which `key_fn` returns `None` are left out of the table.
pub fn build_entity_rollup<F>(records: &[TransactionRecord], key_fn: F) -> RollupTable
where
    F: Fn(&TransactionRecord) -> Option<EntityKey>,
{
    let mut table = RollupTable::default();
    let mut unattributed = 0usize;

    for record in records {
        let Some(key) = key_fn(record) else {
            unattributed += 1;
            continue;
        };
        let row = table.entry(key);
        if record.is_income() {
            row.income += record.amount;
        } else {
            row.expense += record.amount;
        }
        row.transaction_count += 1;
    }

    for row in &mut table.rows {
        row.profit = row.income - row.expense;
        row.margin = margin_pct(row.profit, row.income);
    }

    debug!(
        entities = table.len(),
        unattributed, "Built entity rollup"
    );
    table
}

/// Rollup along one of the standard dimensions
pub fn rollup_by(records: &[TransactionRecord], dimension: Dimension) -> RollupTable {
    build_entity_rollup(records, |record| attribution::resolve(record, dimension))
}

/// Metric a ranking is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Income,
    Expense,
    Profit,
    Margin,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Profit => "profit",
            Self::Margin => "margin",
        }
    }

    pub fn value(&self, rollup: &EntityRollup) -> f64 {
        match self {
            Self::Income => rollup.income,
            Self::Expense => rollup.expense,
            Self::Profit => rollup.profit,
            Self::Margin => rollup.margin,
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" | "expenses" => Ok(Self::Expense),
            "profit" => Ok(Self::Profit),
            "margin" => Ok(Self::Margin),
            _ => Err(format!(
                "Unknown metric: {} (valid: income, expense, profit, margin)",
                s
            )),
        }
    }
}

/// Ranking direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Highest values first
    Top,
    /// Lowest values first
    Bottom,
}

/// Top or bottom `n` rollups by `metric`
///
/// The sort is stable, so ties keep their input order. Returns fewer than `n`
/// entries when fewer exist.
pub fn rank(
    rollups: &[EntityRollup],
    metric: Metric,
    direction: Direction,
    n: usize,
) -> Vec<EntityRollup> {
    let mut ranked: Vec<&EntityRollup> = rollups.iter().collect();
    ranked.sort_by(|a, b| {
        let (a, b) = (metric.value(a), metric.value(b));
        let ord = match direction {
            Direction::Top => b.partial_cmp(&a),
            Direction::Bottom => a.partial_cmp(&b),
        };
        ord.unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.into_iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{expense, income, parse_date};

    const EPSILON: f64 = 1e-9;

    fn scenario_a() -> Vec<TransactionRecord> {
        vec![
            income("p1", "2024-01-15", 100.0).build(),
            expense("e1", "2024-01-20", 40.0).build(),
        ]
    }

    fn scenario_b() -> Vec<TransactionRecord> {
        let mut records = scenario_a();
        records.push(income("p2", "2024-02-10", 50.0).build());
        records.push(expense("e2", "2024-02-18", 80.0).build());
        records
    }

    #[test]
    fn test_scenario_a_single_bucket() {
        let series = build_monthly_series(
            &scenario_a(),
            parse_date("2024-01-01"),
            parse_date("2024-01-31"),
        );
        assert_eq!(series.len(), 1);
        let bucket = &series[0];
        assert_eq!(bucket.month.to_string(), "2024-01");
        assert_eq!(bucket.income, 100.0);
        assert_eq!(bucket.expense, 40.0);
        assert_eq!(bucket.profit, 60.0);
        assert!((bucket.margin - 60.0).abs() < EPSILON);
        assert!(bucket.income_variance_pct.is_none());
        assert!(bucket.profit_variance_pct.is_none());
    }

    #[test]
    fn test_scenario_b_variances() {
        let series = build_monthly_series(
            &scenario_b(),
            parse_date("2024-01-01"),
            parse_date("2024-02-29"),
        );
        assert_eq!(series.len(), 2);
        let feb = &series[1];
        assert_eq!(feb.month.to_string(), "2024-02");
        assert_eq!(feb.income, 50.0);
        assert_eq!(feb.expense, 80.0);
        assert_eq!(feb.profit, -30.0);
        assert!((feb.margin - -60.0).abs() < EPSILON);
        assert!((feb.income_variance_pct.unwrap() - -50.0).abs() < EPSILON);
        assert!((feb.profit_variance_pct.unwrap() - -150.0).abs() < EPSILON);
    }

    #[test]
    fn test_series_contiguous_with_empty_months() {
        let records = vec![
            income("p1", "2023-11-03", 10.0).build(),
            income("p2", "2024-02-03", 10.0).build(),
        ];
        let series =
            build_monthly_series(&records, parse_date("2023-11-15"), parse_date("2024-02-01"));
        let keys: Vec<String> = series.iter().map(|b| b.month.to_string()).collect();
        assert_eq!(keys, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);

        // Empty months are all-zero with zero margin
        assert_eq!(series[1].income, 0.0);
        assert_eq!(series[1].margin, 0.0);
        // Prior income 10 -> 0: -100%
        assert!((series[1].income_variance_pct.unwrap() - -100.0).abs() < EPSILON);
        // Prior income 0: variance undefined
        assert!(series[2].income_variance_pct.is_none());
        assert!(series[3].income_variance_pct.is_none());
        // Prior profit 0: variance undefined
        assert!(series[3].profit_variance_pct.is_none());
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let series = build_monthly_series(
            &scenario_a(),
            parse_date("2024-03-01"),
            parse_date("2024-01-01"),
        );
        assert!(series.is_empty());
    }

    #[test]
    fn test_months_in_range_counts() {
        let months = months_in_range(parse_date("2023-01-31"), parse_date("2024-12-01"));
        assert_eq!(months.len(), 24);
        assert!(months.windows(2).all(|w| w[0].succ() == w[1]));
    }

    #[test]
    fn test_series_sums_match_records() {
        let records = scenario_b();
        let series =
            build_monthly_series(&records, parse_date("2024-01-01"), parse_date("2024-02-29"));
        let income: f64 = series.iter().map(|b| b.income).sum();
        let expense: f64 = series.iter().map(|b| b.expense).sum();
        let all = totals(&records);
        assert!((income - all.income).abs() < EPSILON);
        assert!((expense - all.expense).abs() < EPSILON);
        for bucket in &series {
            assert_eq!(bucket.profit, bucket.income - bucket.expense);
        }
    }

    #[test]
    fn test_totals_margin_zero_without_income() {
        let records = vec![expense("e1", "2024-01-01", 25.0).build()];
        let t = totals(&records);
        assert_eq!(t.profit, -25.0);
        assert_eq!(t.margin, 0.0);
        assert_eq!(t.expense_count, 1);
    }

    #[test]
    fn test_building_rollup_attribution() {
        let records = vec![
            income("p1", "2024-01-05", 1000.0)
                .rental("r1", "prop1", Some("b1"))
                .build(),
            // Broken chain: counted globally, not per building
            income("p2", "2024-01-06", 300.0).build(),
            expense("e1", "2024-01-07", 200.0).building("b1").build(),
            expense("e2", "2024-01-08", 50.0)
                .property("prop9", Some("b2"))
                .build(),
            expense("e3", "2024-01-09", 75.0).build(),
        ];
        let table = rollup_by(&records, Dimension::Building);
        assert_eq!(table.len(), 2);

        let b1 = table.get("b1").unwrap();
        assert_eq!(b1.income, 1000.0);
        assert_eq!(b1.expense, 200.0);
        assert_eq!(b1.profit, 800.0);
        assert!((b1.margin - 80.0).abs() < EPSILON);
        assert_eq!(b1.transaction_count, 2);

        let b2 = table.get("b2").unwrap();
        assert_eq!(b2.margin, 0.0);
        assert_eq!(b2.profit, -50.0);

        let attributed_income: f64 = table.iter().map(|r| r.income).sum();
        assert_eq!(attributed_income, 1000.0);
        assert_eq!(totals(&records).income, 1300.0);
    }

    #[test]
    fn test_rollup_preserves_first_appearance_order() {
        let records = vec![
            expense("e1", "2024-01-01", 1.0).category("Water").build(),
            expense("e2", "2024-01-01", 1.0).category("Electric").build(),
            expense("e3", "2024-01-01", 1.0).category("Water").build(),
        ];
        let table = rollup_by(&records, Dimension::Category);
        let ids: Vec<&str> = table.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["Water", "Electric"]);
    }

    fn rollup(id: &str, profit: f64) -> EntityRollup {
        EntityRollup {
            entity_id: id.to_string(),
            label: id.to_string(),
            income: profit.max(0.0),
            expense: (-profit).max(0.0),
            profit,
            margin: 0.0,
            transaction_count: 1,
        }
    }

    #[test]
    fn test_rank_top_is_non_increasing_and_capped() {
        let rollups: Vec<EntityRollup> = [5.0, 30.0, -10.0, 30.0, 12.0, 0.0, 7.0]
            .iter()
            .enumerate()
            .map(|(i, p)| rollup(&format!("e{}", i), *p))
            .collect();
        let top = rank(&rollups, Metric::Profit, Direction::Top, 5);
        assert_eq!(top.len(), 5);
        assert!(top.windows(2).all(|w| w[0].profit >= w[1].profit));
        // Ties keep input order
        assert_eq!(top[0].entity_id, "e1");
        assert_eq!(top[1].entity_id, "e3");
    }

    #[test]
    fn test_rank_bottom_and_short_input() {
        let rollups = vec![rollup("a", 3.0), rollup("b", -4.0)];
        let bottom = rank(&rollups, Metric::Profit, Direction::Bottom, 5);
        assert_eq!(bottom.len(), 2);
        assert_eq!(bottom[0].entity_id, "b");
        assert!(rank(&rollups, Metric::Income, Direction::Top, 0).is_empty());
    }
}

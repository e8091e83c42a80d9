//! Descriptive statistics over per-entity income series.
//!
//! Each entity's values across the period form one sequence; `count` is the
//! number of days on which the entity has an entry (a zero amount still
//! counts). Standard deviation is the **sample** deviation (ddof = 1), so a
//! single observation yields `NaN` rather than an error. `NaN` serializes as
//! JSON `null`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{income::DailyIncome, types::EntitySeries};

/// {mean, std, min, max, count} for one entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IncomeStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl IncomeStats {
    /// Summarize a sequence. `None` for an empty sequence.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n < 2 {
            f64::NAN
        } else {
            let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (n - 1) as f64).sqrt()
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            mean,
            std,
            min,
            max,
            count: n,
        })
    }
}

/// entity -> statistics.
pub type StatsTable = BTreeMap<String, IncomeStats>;

/// Statistics grouped by client, fund and sales-person.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IncomeStatistics {
    pub client_stats: StatsTable,
    pub fund_stats: StatsTable,
    pub sales_stats: StatsTable,
}

/// Summarize the allocator's three views.
///
/// Fund statistics come from `daily_income` grouped by fund; client and
/// sales-person statistics from the corresponding series.
pub fn show_income_statistics(
    daily_income: &DailyIncome,
    sales_income: &EntitySeries,
    client_income: &EntitySeries,
) -> IncomeStatistics {
    IncomeStatistics {
        client_stats: summarize_series(client_income),
        fund_stats: summarize_series(&daily_income.by_fund()),
        sales_stats: summarize_series(sales_income),
    }
}

/// Flatten a date→entity→amount series into per-entity sequences and
/// summarize each.
pub fn summarize_series(series: &EntitySeries) -> StatsTable {
    let mut values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for entries in series.values() {
        for (entity, amount) in entries {
            values.entry(entity.as_str()).or_default().push(*amount);
        }
    }
    values
        .into_iter()
        .filter_map(|(entity, vs)| IncomeStats::from_values(&vs).map(|s| (entity.to_string(), s)))
        .collect()
}

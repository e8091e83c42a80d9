//! Read-only report views over computed structures.
//!
//! These are the shapes served to the dashboard front-end. Dates serialize as
//! `YYYY-MM-DD`; amounts are plain JSON numbers. Builders are pure functions
//! so they can be tested without a full snapshot.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    breakdown::SalesBreakdowns,
    error::ViewError,
    income::IncomeAllocation,
    stats::{IncomeStatistics, IncomeStats},
    types::EntitySeries,
};

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub income: f64,
}

/// Headline numbers as of the latest computed date plus the full trend.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub total_income: f64,
    pub total_clients: usize,
    pub total_funds: usize,
    pub total_sales: usize,
    pub income_trend: Vec<TrendPoint>,
}

pub fn dashboard_view(allocation: &IncomeAllocation, statistics: &IncomeStatistics) -> DashboardView {
    let totals = allocation.daily_income.totals();
    let total_income = totals.values().next_back().copied().unwrap_or(0.0);

    DashboardView {
        total_income,
        total_clients: latest_len(&allocation.client_income),
        total_funds: statistics.fund_stats.len(),
        total_sales: latest_len(&allocation.sales_income),
        income_trend: totals
            .into_iter()
            .map(|(date, income)| TrendPoint { date, income })
            .collect(),
    }
}

fn latest_len(series: &EntitySeries) -> usize {
    series.values().next_back().map_or(0, BTreeMap::len)
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPersonSummary {
    pub name: String,
    pub cumulative_income: f64,
    /// Clients ordered by cumulative income, largest first.
    pub top_clients: Vec<String>,
    /// Funds ordered by cumulative income, largest first.
    pub top_funds: Vec<String>,
}

/// One row of the daily contribution chart: `{date, <sales_person>: amount, …}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyContribution {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub amounts: BTreeMap<String, f64>,
}

/// A sales-person's day: that day's income plus cumulative client/fund splits.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub income: f64,
    pub clients: BTreeMap<String, f64>,
    pub funds: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesView {
    pub sales_persons: Vec<SalesPersonSummary>,
    pub daily_contribution: Vec<DailyContribution>,
    pub individual_performance: BTreeMap<String, Vec<PerformancePoint>>,
}

pub fn sales_view(sales_income: &EntitySeries, breakdowns: &SalesBreakdowns) -> SalesView {
    let daily_contribution = sales_income
        .iter()
        .map(|(date, amounts)| DailyContribution {
            date: *date,
            amounts: amounts.clone(),
        })
        .collect();

    let people: BTreeSet<&str> = sales_income
        .values()
        .flat_map(|day| day.keys().map(String::as_str))
        .collect();

    let mut sales_persons = Vec::with_capacity(people.len());
    let mut individual_performance = BTreeMap::new();

    for person in people {
        let mut cumulative_income = 0.0;
        let mut clients: BTreeMap<String, f64> = BTreeMap::new();
        let mut funds: BTreeMap<String, f64> = BTreeMap::new();
        let mut points = Vec::new();

        for (date, day) in sales_income {
            let Some(income) = day.get(person) else {
                continue;
            };
            cumulative_income += income;
            if let Some(b) = breakdowns.get(date).and_then(|m| m.get(person)) {
                for (client, amount) in &b.clients {
                    *clients.entry(client.clone()).or_insert(0.0) += amount;
                }
                for (fund, amount) in &b.funds {
                    *funds.entry(fund.clone()).or_insert(0.0) += amount;
                }
            }
            points.push(PerformancePoint {
                date: *date,
                income: *income,
                clients: clients.clone(),
                funds: funds.clone(),
            });
        }

        sales_persons.push(SalesPersonSummary {
            name: person.to_string(),
            cumulative_income,
            top_clients: ranked(&clients),
            top_funds: ranked(&funds),
        });
        individual_performance.insert(person.to_string(), points);
    }

    SalesView {
        sales_persons,
        daily_contribution,
        individual_performance,
    }
}

/// Keys ordered by amount descending; ties by name.
fn ranked(amounts: &BTreeMap<String, f64>) -> Vec<String> {
    let mut entries: Vec<(&String, f64)> = amounts.iter().map(|(k, v)| (k, *v)).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.into_iter().map(|(k, _)| k.clone()).collect()
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClientIncome {
    pub name: String,
    pub income: f64,
}

/// Per-client income on the latest date.
pub fn clients_view(client_income: &EntitySeries) -> Vec<ClientIncome> {
    client_income
        .values()
        .next_back()
        .map(|latest| {
            latest
                .iter()
                .map(|(name, income)| ClientIncome {
                    name: name.clone(),
                    income: *income,
                })
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Funds
// ---------------------------------------------------------------------------

/// fund -> {mean, std, min, max, count}.
///
/// # Errors
/// [`ViewError::MalformedStatistics`] if a record could not have come from a
/// real series: zero count, non-finite mean/min/max, or min > max.
pub fn funds_view(statistics: &IncomeStatistics) -> Result<BTreeMap<String, IncomeStats>, ViewError> {
    for (fund, s) in &statistics.fund_stats {
        check_record(fund, s)?;
    }
    Ok(statistics.fund_stats.clone())
}

fn check_record(fund: &str, s: &IncomeStats) -> Result<(), ViewError> {
    let malformed = |reason: String| ViewError::MalformedStatistics {
        fund: fund.to_string(),
        reason,
    };
    if s.count == 0 {
        return Err(malformed("count is zero".to_string()));
    }
    for (field, v) in [("mean", s.mean), ("min", s.min), ("max", s.max)] {
        if !v.is_finite() {
            return Err(malformed(format!("{field} is not finite ({v})")));
        }
    }
    if s.min > s.max {
        return Err(malformed(format!("min {} > max {}", s.min, s.max)));
    }
    if s.count > 1 && !s.std.is_finite() {
        return Err(malformed(format!("std is not finite ({}) with count {}", s.std, s.count)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_orders_by_amount_then_name() {
        let m = BTreeMap::from([
            ("b".to_string(), 2.0),
            ("a".to_string(), 2.0),
            ("c".to_string(), 5.0),
        ]);
        assert_eq!(ranked(&m), vec!["c", "a", "b"]);
    }

    #[test]
    fn funds_view_rejects_inverted_bounds() {
        let mut stats = IncomeStatistics::default();
        stats.fund_stats.insert(
            "F".to_string(),
            IncomeStats {
                mean: 1.0,
                std: 0.5,
                min: 3.0,
                max: 1.0,
                count: 2,
            },
        );
        let err = funds_view(&stats).unwrap_err();
        assert!(matches!(err, ViewError::MalformedStatistics { ref fund, .. } if fund == "F"));
    }

    #[test]
    fn funds_view_accepts_single_observation_nan_std() {
        let mut stats = IncomeStatistics::default();
        stats
            .fund_stats
            .insert("F".to_string(), IncomeStats::from_values(&[2.0]).unwrap());
        assert_eq!(funds_view(&stats).unwrap().len(), 1);
    }

    #[test]
    fn clients_view_empty_series() {
        assert!(clients_view(&EntitySeries::new()).is_empty());
    }
}

//! Forward income projection beyond `end_date`.
//!
//! Two deterministic models, each over `horizon_days` consecutive calendar
//! days after `end_date`:
//!
//! - **simple**: per fund, the mean daily income over the trailing window
//!   (the last `trend_window_days` dates of history, or all of them if fewer),
//!   repeated flat for every projected day.
//! - **complex**: per fund, the quantity held on `end_date` (`Q0`) drifts by
//!   the average daily net trade flow over the same trailing window (`F`,
//!   net trade quantity dated inside the window ÷ window length in days):
//!   `q(k) = Q0 + k·F`, income `= q(k) × daily_rate`. The drift never carries
//!   a position across zero: a long fund stops at 0 instead of going short,
//!   and a short fund stops at 0 instead of going long. Short funds therefore
//!   project negative income, as in the simple model.
//!
//! Empty history yields [`Forecasts::empty`]; so does a zero horizon.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::EngineError,
    income::DailyIncome,
    ledger::DailyHoldings,
    types::{ProductCatalog, Trade},
};

pub const DEFAULT_HORIZON_DAYS: u32 = 30;
pub const DEFAULT_TREND_WINDOW_DAYS: u32 = 30;

/// Forecast tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastParams {
    /// Number of days projected after `end_date`.
    pub horizon_days: u32,
    /// Trailing history window used for both models. 0 is treated as 1.
    pub trend_window_days: u32,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            trend_window_days: DEFAULT_TREND_WINDOW_DAYS,
        }
    }
}

/// One model's projection.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ForecastSeries {
    /// date -> projected total income.
    pub daily: BTreeMap<NaiveDate, f64>,
    /// date -> running total of `daily`.
    pub cumulative: BTreeMap<NaiveDate, f64>,
    /// fund -> date -> projected income.
    pub by_fund: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl ForecastSeries {
    fn from_by_fund(by_fund: BTreeMap<String, BTreeMap<NaiveDate, f64>>) -> Self {
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for points in by_fund.values() {
            for (date, amount) in points {
                *daily.entry(*date).or_insert(0.0) += amount;
            }
        }
        let mut running = 0.0;
        let cumulative = daily
            .iter()
            .map(|(date, amount)| {
                running += amount;
                (*date, running)
            })
            .collect();
        Self {
            daily,
            cumulative,
            by_fund,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// Projected income summed over the whole horizon.
    pub fn total(&self) -> f64 {
        self.cumulative.values().next_back().copied().unwrap_or(0.0)
    }
}

/// Both model projections.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Forecasts {
    pub simple: ForecastSeries,
    pub complex: ForecastSeries,
}

impl Forecasts {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.complex.is_empty()
    }
}

/// Project income for the `params.horizon_days` days after `end_date`.
///
/// # Errors
/// - [`EngineError::MissingProductInfo`] if a fund held on `end_date` or traded
///   in the window has no product metadata.
/// - [`EngineError::DateOverflow`] if the horizon runs past the calendar.
pub fn generate_forecasts(
    daily_income: &DailyIncome,
    product_info: &ProductCatalog,
    daily_holdings: &DailyHoldings,
    trades: &[Trade],
    end_date: NaiveDate,
    params: &ForecastParams,
) -> Result<Forecasts, EngineError> {
    let history: Vec<NaiveDate> = daily_income
        .dates()
        .iter()
        .copied()
        .filter(|d| *d <= end_date)
        .collect();
    if history.is_empty() || params.horizon_days == 0 {
        return Ok(Forecasts::empty());
    }

    let window_len = (params.trend_window_days.max(1) as usize).min(history.len());
    let window = &history[history.len() - window_len..];
    let horizon = projection_dates(end_date, params.horizon_days)?;

    let simple = simple_model(daily_income, window, &horizon);
    let complex = complex_model(
        product_info,
        daily_holdings,
        trades,
        end_date,
        window,
        &horizon,
    )?;

    debug!(
        horizon = horizon.len(),
        window = window_len,
        simple_total = simple.total(),
        complex_total = complex.total(),
        "forecasts generated"
    );

    Ok(Forecasts { simple, complex })
}

fn projection_dates(end_date: NaiveDate, horizon_days: u32) -> Result<Vec<NaiveDate>, EngineError> {
    (1..=u64::from(horizon_days))
        .map(|k| {
            end_date
                .checked_add_days(Days::new(k))
                .ok_or(EngineError::DateOverflow(end_date))
        })
        .collect()
}

fn simple_model(
    daily_income: &DailyIncome,
    window: &[NaiveDate],
    horizon: &[NaiveDate],
) -> ForecastSeries {
    let mut fund_sums: BTreeMap<&str, f64> = BTreeMap::new();
    for date in window {
        for c in daily_income.cells_on(*date) {
            *fund_sums.entry(c.fund.as_str()).or_insert(0.0) += c.amount;
        }
    }

    let n = window.len() as f64;
    let by_fund = fund_sums
        .into_iter()
        .map(|(fund, sum)| {
            let mean = sum / n;
            let points = horizon.iter().map(|d| (*d, mean)).collect();
            (fund.to_string(), points)
        })
        .collect();

    ForecastSeries::from_by_fund(by_fund)
}

fn complex_model(
    product_info: &ProductCatalog,
    daily_holdings: &DailyHoldings,
    trades: &[Trade],
    end_date: NaiveDate,
    window: &[NaiveDate],
    horizon: &[NaiveDate],
) -> Result<ForecastSeries, EngineError> {
    let current = match daily_holdings.on(end_date) {
        Some(_) => daily_holdings.by_fund_on(end_date),
        None => daily_holdings.latest_by_fund(),
    };

    let window_start = window.first().copied().unwrap_or(end_date);
    let mut flows: BTreeMap<&str, f64> = BTreeMap::new();
    let mut flow_accounts: BTreeMap<&str, &str> = BTreeMap::new();
    for t in trades
        .iter()
        .filter(|t| t.date >= window_start && t.date <= end_date)
    {
        *flows.entry(t.fund.as_str()).or_insert(0.0) += t.quantity;
        flow_accounts.entry(t.fund.as_str()).or_insert(t.account.as_str());
    }

    let funds: BTreeSet<&str> = current
        .keys()
        .map(String::as_str)
        .chain(flows.keys().copied())
        .collect();

    let mut by_fund = BTreeMap::new();
    for fund in funds {
        let rate = product_info
            .daily_rate(fund)
            .ok_or_else(|| EngineError::MissingProductInfo {
                fund: fund.to_string(),
                account: flow_accounts.get(fund).copied().unwrap_or("*").to_string(),
                date: end_date,
            })?;
        let q0 = current.get(fund).copied().unwrap_or(0.0);
        let per_day = flows.get(fund).copied().unwrap_or(0.0) / window.len().max(1) as f64;

        let points = horizon
            .iter()
            .zip(1u32..)
            .map(|(date, k)| {
                let qty = drifted_quantity(q0, f64::from(k) * per_day);
                (*date, qty * rate)
            })
            .collect();
        by_fund.insert(fund.to_string(), points);
    }

    Ok(ForecastSeries::from_by_fund(by_fund))
}

/// `q0 + drift`, stopped at zero if the drift would flip the position's sign.
/// A flat starting position follows the drift in either direction.
fn drifted_quantity(q0: f64, drift: f64) -> f64 {
    let q = q0 + drift;
    if q0 > 0.0 {
        q.max(0.0)
    } else if q0 < 0.0 {
        q.min(0.0)
    } else {
        q
    }
}

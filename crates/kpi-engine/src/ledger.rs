//! Holdings ledger. Rolls a position snapshot forward through a trade log.
//!
//! # Contract
//! - `initial_holdings` is the position table as of the day **before**
//!   `start_date`.
//! - Every calendar day in `[start_date, end_date]` gets exactly one complete
//!   snapshot, including days with no trades.
//! - `holdings[D] == holdings[D-1] + Σ trades dated D` per (account, fund).
//! - Accounts/funds first seen in a trade start from an implicit zero.
//! - Zero and negative quantities are kept (short positions are representable).
//! - Trades dated outside the period are ignored and reported once via
//!   `tracing::warn!`.
//!
//! # Determinism
//! Pure function of its inputs (no IO, no clock). Trades on the same day are
//! applied in input order.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use crate::{
    error::EngineError,
    types::{PositionKey, PositionMap, Trade},
};

/// One complete position table per day of the period.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DailyHoldings {
    days: BTreeMap<NaiveDate, PositionMap>,
}

impl DailyHoldings {
    /// Period days in chronological order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &PositionMap)> {
        self.days.iter()
    }

    pub fn on(&self, date: NaiveDate) -> Option<&PositionMap> {
        self.days.get(&date)
    }

    pub fn first(&self) -> Option<(NaiveDate, &PositionMap)> {
        self.days.iter().next().map(|(d, p)| (*d, p))
    }

    pub fn last(&self) -> Option<(NaiveDate, &PositionMap)> {
        self.days.iter().next_back().map(|(d, p)| (*d, p))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Quantity for (account, fund) on `date`; 0 if not held or date unknown.
    pub fn quantity(&self, date: NaiveDate, account: &str, fund: &str) -> f64 {
        self.days
            .get(&date)
            .and_then(|p| p.get(&PositionKey::new(account, fund)))
            .copied()
            .unwrap_or(0.0)
    }

    /// fund -> Σ quantity across accounts on `date`.
    pub fn by_fund_on(&self, date: NaiveDate) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        if let Some(day) = self.days.get(&date) {
            for (key, qty) in day {
                *out.entry(key.fund.clone()).or_insert(0.0) += qty;
            }
        }
        out
    }

    /// [`by_fund_on`](Self::by_fund_on) for the last day of the period.
    pub fn latest_by_fund(&self) -> BTreeMap<String, f64> {
        self.last()
            .map(|(d, _)| self.by_fund_on(d))
            .unwrap_or_default()
    }
}

/// Roll `initial_holdings` forward through `trades` for each day of
/// `[start_date, end_date]`.
///
/// # Errors
/// - [`EngineError::InvalidDateRange`] if `start_date > end_date`.
/// - [`EngineError::DateOverflow`] if a period day is not representable.
pub fn calculate_daily_holdings(
    initial_holdings: &PositionMap,
    trades: &[Trade],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<DailyHoldings, EngineError> {
    if start_date > end_date {
        return Err(EngineError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }

    let mut by_day: BTreeMap<NaiveDate, Vec<&Trade>> = BTreeMap::new();
    let mut ignored = IgnoredTrades::default();
    for t in trades {
        if t.date < start_date || t.date > end_date {
            ignored.record(t.date);
            continue;
        }
        by_day.entry(t.date).or_default().push(t);
    }
    ignored.report(start_date, end_date);

    let mut days = BTreeMap::new();
    let mut current = initial_holdings.clone();

    let span = (end_date - start_date).num_days().unsigned_abs();
    for offset in 0..=span {
        let date = start_date
            .checked_add_days(Days::new(offset))
            .ok_or(EngineError::DateOverflow(start_date))?;
        if let Some(todays) = by_day.get(&date) {
            for t in todays {
                *current
                    .entry(PositionKey::new(t.account.as_str(), t.fund.as_str()))
                    .or_insert(0.0) += t.quantity;
            }
        }
        days.insert(date, current.clone());
    }

    debug!(
        days = days.len(),
        positions = current.len(),
        trades_applied = trades.len() - ignored.count,
        "daily holdings rolled forward"
    );

    Ok(DailyHoldings { days })
}

#[derive(Default)]
struct IgnoredTrades {
    count: usize,
    earliest: Option<NaiveDate>,
    latest: Option<NaiveDate>,
}

impl IgnoredTrades {
    fn record(&mut self, date: NaiveDate) {
        self.count += 1;
        self.earliest = Some(self.earliest.map_or(date, |d| d.min(date)));
        self.latest = Some(self.latest.map_or(date, |d| d.max(date)));
    }

    fn report(&self, start: NaiveDate, end: NaiveDate) {
        if self.count == 0 {
            return;
        }
        warn!(
            ignored = self.count,
            earliest = ?self.earliest,
            latest = ?self.latest,
            %start,
            %end,
            "trades dated outside the period were ignored"
        );
    }
}

//! Income allocator: holdings × product rate, attributed to clients and
//! sales-persons.
//!
//! Income is stored once, as a flat list of [`IncomeCell`] records. Every
//! nested view (date→client→fund, date→sales_person, …) is derived from that
//! list, so all views sum to the same per-date total by construction.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::EngineError,
    ledger::DailyHoldings,
    types::{AssignmentTable, EntitySeries, ProductCatalog},
};

/// One (date, account, fund) income amount with its attribution labels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IncomeCell {
    pub date: NaiveDate,
    pub account: String,
    pub client: String,
    pub sales_person: String,
    pub fund: String,
    pub amount: f64,
}

/// Flat, date-ordered income container.
///
/// `dates` lists every day of the computed period even if no cell falls on it,
/// so every grouping view carries a key for every day.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DailyIncome {
    dates: Vec<NaiveDate>,
    cells: Vec<IncomeCell>,
}

impl DailyIncome {
    /// Build from period dates and cells. Cells are stably sorted by date;
    /// cell dates missing from `dates` are added.
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>, mut cells: Vec<IncomeCell>) -> Self {
        let mut all: BTreeSet<NaiveDate> = dates.into_iter().collect();
        all.extend(cells.iter().map(|c| c.date));
        cells.sort_by_key(|c| c.date);
        Self {
            dates: all.into_iter().collect(),
            cells,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn cells(&self) -> &[IncomeCell] {
        &self.cells
    }

    /// True when there is no historical day at all.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Cells dated exactly `date`.
    pub fn cells_on(&self, date: NaiveDate) -> &[IncomeCell] {
        let lo = self.cells.partition_point(|c| c.date < date);
        let hi = self.cells.partition_point(|c| c.date <= date);
        &self.cells[lo..hi]
    }

    /// Sum cells per date under an arbitrary grouping key.
    pub fn group_by<K, F>(&self, key: F) -> BTreeMap<NaiveDate, BTreeMap<K, f64>>
    where
        K: Ord,
        F: Fn(&IncomeCell) -> K,
    {
        let mut out: BTreeMap<NaiveDate, BTreeMap<K, f64>> =
            self.dates.iter().map(|d| (*d, BTreeMap::new())).collect();
        for c in &self.cells {
            *out.entry(c.date)
                .or_default()
                .entry(key(c))
                .or_insert(0.0) += c.amount;
        }
        out
    }

    /// date -> fund -> amount.
    pub fn by_fund(&self) -> EntitySeries {
        self.group_by(|c| c.fund.clone())
    }

    /// date -> client -> amount.
    pub fn by_client(&self) -> EntitySeries {
        self.group_by(|c| c.client.clone())
    }

    /// date -> sales_person -> amount.
    pub fn by_sales_person(&self) -> EntitySeries {
        self.group_by(|c| c.sales_person.clone())
    }

    /// date -> client -> fund -> amount.
    pub fn by_client_fund(&self) -> BTreeMap<NaiveDate, BTreeMap<String, BTreeMap<String, f64>>> {
        let mut out: BTreeMap<NaiveDate, BTreeMap<String, BTreeMap<String, f64>>> =
            self.dates.iter().map(|d| (*d, BTreeMap::new())).collect();
        for c in &self.cells {
            *out.entry(c.date)
                .or_default()
                .entry(c.client.clone())
                .or_default()
                .entry(c.fund.clone())
                .or_insert(0.0) += c.amount;
        }
        out
    }

    /// date -> total income across every cell.
    pub fn totals(&self) -> BTreeMap<NaiveDate, f64> {
        let mut out: BTreeMap<NaiveDate, f64> = self.dates.iter().map(|d| (*d, 0.0)).collect();
        for c in &self.cells {
            *out.entry(c.date).or_insert(0.0) += c.amount;
        }
        out
    }

    /// Distinct funds with at least one cell.
    pub fn funds(&self) -> BTreeSet<&str> {
        self.cells.iter().map(|c| c.fund.as_str()).collect()
    }
}

/// The three parallel income views produced by the allocator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IncomeAllocation {
    /// Fund-level cells (date→client→fund via [`DailyIncome::by_client_fund`]).
    pub daily_income: DailyIncome,
    /// date -> sales_person -> amount.
    pub sales_income: EntitySeries,
    /// date -> client -> amount.
    pub client_income: EntitySeries,
}

/// Multiply each day's holdings by the fund's daily rate and attribute the
/// result via `client_sales`.
///
/// Accounts without an assignment are booked to [`crate::UNASSIGNED`].
///
/// # Errors
/// [`EngineError::MissingProductInfo`] for any held fund absent from
/// `product_info`, including funds held at zero quantity.
pub fn calculate_daily_income(
    daily_holdings: &DailyHoldings,
    product_info: &ProductCatalog,
    client_sales: &AssignmentTable,
) -> Result<IncomeAllocation, EngineError> {
    let mut cells = Vec::new();
    let mut unassigned: BTreeSet<&str> = BTreeSet::new();

    for (date, day) in daily_holdings.iter() {
        for (key, qty) in day {
            let rate = product_info.daily_rate(&key.fund).ok_or_else(|| {
                EngineError::MissingProductInfo {
                    fund: key.fund.clone(),
                    account: key.account.clone(),
                    date: *date,
                }
            })?;
            if client_sales.get(&key.account).is_none() {
                unassigned.insert(key.account.as_str());
            }
            let (client, sales_person) = client_sales.resolve(&key.account);
            cells.push(IncomeCell {
                date: *date,
                account: key.account.clone(),
                client: client.to_string(),
                sales_person: sales_person.to_string(),
                fund: key.fund.clone(),
                amount: qty * rate,
            });
        }
    }

    if !unassigned.is_empty() {
        debug!(
            accounts = ?unassigned,
            "accounts without client/sales assignment booked as unassigned"
        );
    }

    let daily_income = DailyIncome::new(daily_holdings.dates(), cells);
    let sales_income = daily_income.by_sales_person();
    let client_income = daily_income.by_client();

    Ok(IncomeAllocation {
        daily_income,
        sales_income,
        client_income,
    })
}

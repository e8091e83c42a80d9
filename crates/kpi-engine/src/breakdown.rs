use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::income::DailyIncome;

/// One sales-person's income on one day, split by client and by fund.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SalesBreakdown {
    pub clients: BTreeMap<String, f64>,
    pub funds: BTreeMap<String, f64>,
}

impl SalesBreakdown {
    pub fn total(&self) -> f64 {
        self.clients.values().sum()
    }
}

/// date -> sales_person -> breakdown.
pub type SalesBreakdowns = BTreeMap<NaiveDate, BTreeMap<String, SalesBreakdown>>;

/// date -> client -> fund -> amount.
pub type ClientBreakdowns = BTreeMap<NaiveDate, BTreeMap<String, BTreeMap<String, f64>>>;

/// Regroup income cells by sales-person, then by client and by fund.
///
/// Attribution labels are already resolved on each cell by the allocator, so
/// no assignment lookup happens here. Every period date carries a key.
pub fn generate_sales_person_breakdowns(daily_income: &DailyIncome) -> SalesBreakdowns {
    let mut out: SalesBreakdowns = daily_income
        .dates()
        .iter()
        .map(|d| (*d, BTreeMap::new()))
        .collect();

    for c in daily_income.cells() {
        let b = out
            .entry(c.date)
            .or_default()
            .entry(c.sales_person.clone())
            .or_default();
        *b.clients.entry(c.client.clone()).or_insert(0.0) += c.amount;
        *b.funds.entry(c.fund.clone()).or_insert(0.0) += c.amount;
    }

    out
}

/// Client-centric view: date -> client -> fund -> amount.
pub fn generate_client_breakdowns(daily_income: &DailyIncome) -> ClientBreakdowns {
    daily_income.by_client_fund()
}

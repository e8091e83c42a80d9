use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reserved client / sales-person label for accounts with no assignment row.
pub const UNASSIGNED: &str = "unassigned";

/// Default day-count basis for annual income rates.
pub const DEFAULT_DAY_BASIS: u32 = 365;

/// date -> entity -> amount. Dates iterate chronologically (BTreeMap).
pub type EntitySeries = BTreeMap<NaiveDate, BTreeMap<String, f64>>;

/// (account, fund) key for a held position.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub account: String,
    pub fund: String,
}

impl PositionKey {
    pub fn new<A: Into<String>, F: Into<String>>(account: A, fund: F) -> Self {
        Self {
            account: account.into(),
            fund: fund.into(),
        }
    }
}

/// Full position table for one day: (account, fund) -> quantity.
///
/// Quantities are signed; zero and negative cells are kept.
pub type PositionMap = BTreeMap<PositionKey, f64>;

/// Helper to build a PositionMap with minimal boilerplate.
pub fn positions<I, A, F>(items: I) -> PositionMap
where
    I: IntoIterator<Item = (A, F, f64)>,
    A: Into<String>,
    F: Into<String>,
{
    let mut m = PositionMap::new();
    for (account, fund, qty) in items {
        *m.entry(PositionKey::new(account, fund)).or_insert(0.0) += qty;
    }
    m
}

/// A single trade-log row. `quantity` is the signed delta: buy > 0, sell < 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub account: String,
    pub fund: String,
    pub quantity: f64,
}

impl Trade {
    pub fn new<A: Into<String>, F: Into<String>>(
        date: NaiveDate,
        account: A,
        fund: F,
        quantity: f64,
    ) -> Self {
        Self {
            date,
            account: account.into(),
            fund: fund.into(),
            quantity,
        }
    }
}

/// How a product's income accrues.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncomeRate {
    /// Income per unit per calendar day.
    Daily { rate: f64 },
    /// Income per unit per year, accrued evenly over `day_basis` days.
    Annual { rate: f64, day_basis: u32 },
}

impl IncomeRate {
    /// The single scalar multiplier applied to a day's quantity.
    pub fn daily(&self) -> f64 {
        match *self {
            IncomeRate::Daily { rate } => rate,
            IncomeRate::Annual { rate, day_basis } => {
                let basis = if day_basis == 0 {
                    DEFAULT_DAY_BASIS
                } else {
                    day_basis
                };
                rate / f64::from(basis)
            }
        }
    }
}

/// Product metadata row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub fund: String,
    pub name: Option<String>,
    pub rate: IncomeRate,
}

impl ProductInfo {
    pub fn daily<F: Into<String>>(fund: F, rate: f64) -> Self {
        Self {
            fund: fund.into(),
            name: None,
            rate: IncomeRate::Daily { rate },
        }
    }

    pub fn annual<F: Into<String>>(fund: F, rate: f64, day_basis: u32) -> Self {
        Self {
            fund: fund.into(),
            name: None,
            rate: IncomeRate::Annual { rate, day_basis },
        }
    }

    pub fn daily_rate(&self) -> f64 {
        self.rate.daily()
    }
}

/// Product metadata keyed by fund.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCatalog {
    products: BTreeMap<String, ProductInfo>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product; a later row for the same fund replaces the earlier one.
    pub fn insert(&mut self, info: ProductInfo) -> Option<ProductInfo> {
        self.products.insert(info.fund.clone(), info)
    }

    pub fn get(&self, fund: &str) -> Option<&ProductInfo> {
        self.products.get(fund)
    }

    pub fn daily_rate(&self, fund: &str) -> Option<f64> {
        self.get(fund).map(ProductInfo::daily_rate)
    }

    pub fn contains(&self, fund: &str) -> bool {
        self.products.contains_key(fund)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductInfo> {
        self.products.values()
    }
}

impl FromIterator<ProductInfo> for ProductCatalog {
    fn from_iter<T: IntoIterator<Item = ProductInfo>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for info in iter {
            catalog.insert(info);
        }
        catalog
    }
}

/// Client / sales-person labels for one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub client: String,
    pub sales_person: String,
}

/// account -> {client, sales_person}. Static for the period.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentTable {
    accounts: BTreeMap<String, Assignment>,
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<A, C, S>(&mut self, account: A, client: C, sales_person: S) -> Option<Assignment>
    where
        A: Into<String>,
        C: Into<String>,
        S: Into<String>,
    {
        self.accounts.insert(
            account.into(),
            Assignment {
                client: client.into(),
                sales_person: sales_person.into(),
            },
        )
    }

    pub fn get(&self, account: &str) -> Option<&Assignment> {
        self.accounts.get(account)
    }

    /// (client, sales_person) for an account, falling back to [`UNASSIGNED`].
    pub fn resolve(&self, account: &str) -> (&str, &str) {
        match self.accounts.get(account) {
            Some(a) => (a.client.as_str(), a.sales_person.as_str()),
            None => (UNASSIGNED, UNASSIGNED),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Assignment)> {
        self.accounts.iter()
    }
}

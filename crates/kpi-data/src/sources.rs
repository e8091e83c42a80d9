//! One loader per source table.

use std::{fs::File, io::Read, path::Path};

use chrono::NaiveDate;
use kpi_engine::{
    AssignmentTable, IncomeRate, PositionKey, PositionMap, ProductCatalog, ProductInfo, Trade,
    DEFAULT_DAY_BASIS,
};
use serde::Deserialize;
use tracing::debug;

use crate::{error::LoadError, table::Table};

const HOLDINGS: &str = "initial holdings";
const TRADES: &str = "trade log";
const PRODUCTS: &str = "product info";
const CLIENTS: &str = "client list";

/// Accepted trade-date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

fn open(table: &'static str, path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open {
        table,
        path: path.to_path_buf(),
        source,
    })
}

fn non_empty<R: Read>(t: &Table<R>, line: u64, column: &str, value: &str) -> Result<(), LoadError> {
    if value.is_empty() {
        Err(t.invalid(line, format!("empty '{column}'")))
    } else {
        Ok(())
    }
}

fn finite<R: Read>(t: &Table<R>, line: u64, column: &str, value: f64) -> Result<f64, LoadError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(t.invalid(line, format!("'{column}' is not finite ({value})")))
    }
}

// ---------------------------------------------------------------------------
// Initial holdings
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct HoldingRow {
    account: String,
    fund: String,
    quantity: f64,
}

pub fn load_initial_holdings(path: &Path) -> Result<PositionMap, LoadError> {
    read_initial_holdings(open(HOLDINGS, path)?)
}

pub fn parse_initial_holdings(src: &str) -> Result<PositionMap, LoadError> {
    read_initial_holdings(src.as_bytes())
}

fn read_initial_holdings<R: Read>(source: R) -> Result<PositionMap, LoadError> {
    let mut t = Table::new(HOLDINGS, source)?;
    t.require(&["account", "fund", "quantity"])?;

    let mut out = PositionMap::new();
    for (line, row) in t.rows::<HoldingRow>()? {
        non_empty(&t, line, "account", &row.account)?;
        non_empty(&t, line, "fund", &row.fund)?;
        let qty = finite(&t, line, "quantity", row.quantity)?;
        let key = PositionKey::new(row.account, row.fund);
        if out.contains_key(&key) {
            return Err(t.duplicate(line, format!("{}/{}", key.account, key.fund)));
        }
        out.insert(key, qty);
    }

    debug!(table = t.name(), rows = out.len(), "table parsed");
    Ok(out)
}

// ---------------------------------------------------------------------------
// Trade log
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TradeRow {
    date: String,
    account: String,
    fund: String,
    quantity: f64,
    #[serde(default)]
    side: Option<String>,
}

pub fn load_trades(path: &Path) -> Result<Vec<Trade>, LoadError> {
    read_trades(open(TRADES, path)?)
}

pub fn parse_trades(src: &str) -> Result<Vec<Trade>, LoadError> {
    read_trades(src.as_bytes())
}

/// Parse a trade date in any of the accepted layouts.
pub fn parse_trade_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
}

fn read_trades<R: Read>(source: R) -> Result<Vec<Trade>, LoadError> {
    let mut t = Table::new(TRADES, source)?;
    t.require(&["date", "account", "fund", "quantity"])?;

    let mut out = Vec::new();
    for (line, row) in t.rows::<TradeRow>()? {
        let date = parse_trade_date(&row.date)
            .ok_or_else(|| t.invalid(line, format!("cannot parse date '{}'", row.date)))?;
        non_empty(&t, line, "account", &row.account)?;
        non_empty(&t, line, "fund", &row.fund)?;
        let qty = finite(&t, line, "quantity", row.quantity)?;

        let signed = match row.side.as_deref().filter(|s| !s.is_empty()) {
            None => qty,
            Some(side) => {
                if qty < 0.0 {
                    return Err(t.invalid(line, "quantity must be unsigned when 'side' is given"));
                }
                match side.to_ascii_uppercase().as_str() {
                    "BUY" => qty,
                    "SELL" => -qty,
                    other => return Err(t.invalid(line, format!("unknown side '{other}'"))),
                }
            }
        };

        out.push(Trade::new(date, row.account, row.fund, signed));
    }

    debug!(table = t.name(), rows = out.len(), "table parsed");
    Ok(out)
}

// ---------------------------------------------------------------------------
// Product info
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ProductRow {
    fund: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    daily_rate: Option<f64>,
    #[serde(default)]
    annual_rate: Option<f64>,
    #[serde(default)]
    day_basis: Option<u32>,
}

pub fn load_product_info(path: &Path) -> Result<ProductCatalog, LoadError> {
    read_product_info(open(PRODUCTS, path)?)
}

pub fn parse_product_info(src: &str) -> Result<ProductCatalog, LoadError> {
    read_product_info(src.as_bytes())
}

fn read_product_info<R: Read>(source: R) -> Result<ProductCatalog, LoadError> {
    let mut t = Table::new(PRODUCTS, source)?;
    t.require(&["fund"])?;
    if !t.has("daily_rate") && !t.has("annual_rate") {
        return Err(LoadError::MissingColumn {
            table: PRODUCTS,
            column: "daily_rate",
        });
    }

    let mut out = ProductCatalog::new();
    for (line, row) in t.rows::<ProductRow>()? {
        non_empty(&t, line, "fund", &row.fund)?;
        let rate = match (row.daily_rate, row.annual_rate) {
            (Some(rate), _) => IncomeRate::Daily {
                rate: finite(&t, line, "daily_rate", rate)?,
            },
            (None, Some(rate)) => IncomeRate::Annual {
                rate: finite(&t, line, "annual_rate", rate)?,
                day_basis: row.day_basis.unwrap_or(DEFAULT_DAY_BASIS),
            },
            (None, None) => {
                return Err(t.invalid(line, "neither 'daily_rate' nor 'annual_rate' is set"));
            }
        };
        if out.contains(&row.fund) {
            return Err(t.duplicate(line, row.fund));
        }
        out.insert(ProductInfo {
            fund: row.fund,
            name: row.name.filter(|n| !n.is_empty()),
            rate,
        });
    }

    debug!(table = t.name(), rows = out.len(), "table parsed");
    Ok(out)
}

// ---------------------------------------------------------------------------
// Client list
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ClientRow {
    account: String,
    client: String,
    sales_person: String,
}

pub fn load_client_sales(path: &Path) -> Result<AssignmentTable, LoadError> {
    read_client_sales(open(CLIENTS, path)?)
}

pub fn parse_client_sales(src: &str) -> Result<AssignmentTable, LoadError> {
    read_client_sales(src.as_bytes())
}

fn read_client_sales<R: Read>(source: R) -> Result<AssignmentTable, LoadError> {
    let mut t = Table::new(CLIENTS, source)?;
    t.require(&["account", "client", "sales_person"])?;

    let mut out = AssignmentTable::new();
    for (line, row) in t.rows::<ClientRow>()? {
        non_empty(&t, line, "account", &row.account)?;
        if out.get(&row.account).is_some() {
            return Err(t.duplicate(line, row.account));
        }
        out.insert(row.account, row.client, row.sales_person);
    }

    debug!(table = t.name(), rows = out.len(), "table parsed");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_dates_accept_several_layouts() {
        let want = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_trade_date("2024-01-05"), Some(want));
        assert_eq!(parse_trade_date("2024/01/05"), Some(want));
        assert_eq!(parse_trade_date("20240105"), Some(want));
        assert_eq!(parse_trade_date("05.01.2024"), None);
    }

    #[test]
    fn side_column_signs_quantity() {
        let trades = parse_trades(
            "date,account,fund,quantity,side\n\
             2024-01-02,A,X,10,BUY\n\
             2024-01-03,A,X,4,sell\n\
             2024-01-04,A,X,-1,\n",
        )
        .unwrap();
        let q: Vec<f64> = trades.iter().map(|t| t.quantity).collect();
        assert_eq!(q, vec![10.0, -4.0, -1.0]);
    }
}

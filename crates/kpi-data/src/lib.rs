//! kpi-data
//!
//! CSV loaders for the four source tables the engine consumes.
//!
//! Each loader has a path form (`load_*`) and an in-memory form (`parse_*`)
//! so tests can feed CSV text without touching the filesystem.
//!
//! ## Column contracts (case-insensitive, order-independent)
//!
//! | Table            | Required                         | Optional                 |
//! |------------------|----------------------------------|--------------------------|
//! | initial holdings | `account`, `fund`, `quantity`    |                          |
//! | trade log        | `date`, `account`, `fund`, `quantity` | `side` (`BUY`/`SELL`) |
//! | product info     | `fund`, one of `daily_rate` / `annual_rate` | `name`, `day_basis` |
//! | client list      | `account`, `client`, `sales_person` |                       |
//!
//! Header cells are trimmed and lower-cased, a leading UTF-8 BOM is ignored
//! and blank lines are skipped. Every failure is fatal and carries the line
//! number it was raised on.

mod error;
mod sources;
mod table;

use std::path::{Path, PathBuf};

use kpi_engine::EngineInputs;
use tracing::info;

pub use error::LoadError;
pub use sources::{
    load_client_sales, load_initial_holdings, load_product_info, load_trades, parse_client_sales,
    parse_initial_holdings, parse_product_info, parse_trades, parse_trade_date,
};

/// On-disk locations of the four source tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPaths {
    pub initial_holdings: PathBuf,
    pub trades: PathBuf,
    pub product_info: PathBuf,
    pub client_list: PathBuf,
}

impl DataPaths {
    /// Resolve relative entries against `base`; absolute entries are kept.
    pub fn resolved_against(&self, base: &Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        };
        Self {
            initial_holdings: join(&self.initial_holdings),
            trades: join(&self.trades),
            product_info: join(&self.product_info),
            client_list: join(&self.client_list),
        }
    }
}

/// Load all four tables into [`EngineInputs`].
///
/// # Errors
/// The first [`LoadError`] raised by any table.
pub fn load_inputs(paths: &DataPaths) -> Result<EngineInputs, LoadError> {
    let initial_holdings = load_initial_holdings(&paths.initial_holdings)?;
    let trades = load_trades(&paths.trades)?;
    let products = load_product_info(&paths.product_info)?;
    let assignments = load_client_sales(&paths.client_list)?;

    info!(
        positions = initial_holdings.len(),
        trades = trades.len(),
        products = products.len(),
        accounts = assignments.len(),
        "source tables loaded"
    );

    Ok(EngineInputs {
        initial_holdings,
        trades,
        products,
        assignments,
    })
}

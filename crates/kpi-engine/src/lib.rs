//! kpi-engine
//!
//! Holdings and income attribution engine.
//! - Daily holdings roll-forward from an initial snapshot and a trade log
//! - Income = quantity × product daily rate, attributed to client and sales-person
//! - Cumulative series, descriptive statistics, breakdowns, forecasts
//! - `EngineSnapshot`: one immutable bundle per batch pass
//! - Pure deterministic logic (no IO; the clock is only read for snapshot metadata)

mod error;
mod types;

pub mod breakdown;
pub mod cumulative;
pub mod forecast;
pub mod income;
pub mod ledger;
pub mod snapshot;
pub mod stats;
pub mod views;

pub use breakdown::{
    generate_client_breakdowns, generate_sales_person_breakdowns, ClientBreakdowns,
    SalesBreakdown, SalesBreakdowns,
};
pub use cumulative::{calculate_cumulative_income, CumulativeIncome};
pub use error::{EngineError, ViewError};
pub use forecast::{generate_forecasts, ForecastParams, ForecastSeries, Forecasts};
pub use income::{calculate_daily_income, DailyIncome, IncomeAllocation, IncomeCell};
pub use ledger::{calculate_daily_holdings, DailyHoldings};
pub use snapshot::{EngineInputs, EngineParams, EngineSnapshot, SnapshotSummary};
pub use stats::{show_income_statistics, summarize_series, IncomeStatistics, IncomeStats, StatsTable};
pub use views::{
    ClientIncome, DailyContribution, DashboardView, PerformancePoint, SalesPersonSummary,
    SalesView, TrendPoint,
};

pub use types::{
    positions, Assignment, AssignmentTable, EntitySeries, IncomeRate, PositionKey, PositionMap,
    ProductCatalog, ProductInfo, Trade, DEFAULT_DAY_BASIS, UNASSIGNED,
};

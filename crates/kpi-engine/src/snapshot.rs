//! Engine snapshot: every computed structure for one batch pass.
//!
//! `EngineSnapshot::build` runs the pipeline in dependency order:
//!
//! ```text
//! holdings -> income allocation -> { cumulative, statistics, forecasts, breakdowns }
//! ```
//!
//! The result is immutable. Consumers share it as `Arc<EngineSnapshot>`;
//! recomputation builds a new snapshot and replaces the old one wholesale.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    breakdown::{
        generate_client_breakdowns, generate_sales_person_breakdowns, ClientBreakdowns,
        SalesBreakdowns,
    },
    cumulative::{calculate_cumulative_income, CumulativeIncome},
    error::{EngineError, ViewError},
    forecast::{generate_forecasts, ForecastParams, Forecasts},
    income::{calculate_daily_income, IncomeAllocation},
    ledger::{calculate_daily_holdings, DailyHoldings},
    stats::{show_income_statistics, IncomeStatistics, IncomeStats},
    types::{AssignmentTable, PositionMap, ProductCatalog, Trade},
    views::{self, ClientIncome, DashboardView, SalesView},
};

/// Loader output: the four source tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineInputs {
    pub initial_holdings: PositionMap,
    pub trades: Vec<Trade>,
    pub products: ProductCatalog,
    pub assignments: AssignmentTable,
}

/// Period and forecast settings for one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EngineParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub forecast: ForecastParams,
}

impl EngineParams {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            forecast: ForecastParams::default(),
        }
    }

    pub fn with_forecast(mut self, forecast: ForecastParams) -> Self {
        self.forecast = forecast;
        self
    }
}

/// Identity and headline counts of a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub snapshot_id: Uuid,
    pub built_at: DateTime<Utc>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: usize,
    pub funds: usize,
    pub clients: usize,
    pub sales_persons: usize,
    pub trades: usize,
    pub latest_total_income: f64,
}

#[derive(Clone, Debug)]
pub struct EngineSnapshot {
    id: Uuid,
    built_at: DateTime<Utc>,
    params: EngineParams,
    trade_count: usize,
    holdings: DailyHoldings,
    allocation: IncomeAllocation,
    cumulative_sales_income: CumulativeIncome,
    cumulative_client_income: CumulativeIncome,
    statistics: IncomeStatistics,
    forecasts: Forecasts,
    sales_breakdowns: SalesBreakdowns,
    client_breakdowns: ClientBreakdowns,
}

impl EngineSnapshot {
    /// Run the full pipeline over `inputs`.
    ///
    /// # Errors
    /// Any [`EngineError`] from a stage aborts the build; nothing partial is
    /// returned.
    pub fn build(inputs: &EngineInputs, params: &EngineParams) -> Result<Self, EngineError> {
        let holdings = calculate_daily_holdings(
            &inputs.initial_holdings,
            &inputs.trades,
            params.start_date,
            params.end_date,
        )?;
        let allocation = calculate_daily_income(&holdings, &inputs.products, &inputs.assignments)?;
        let cumulative_sales_income = calculate_cumulative_income(&allocation.sales_income);
        let cumulative_client_income = calculate_cumulative_income(&allocation.client_income);
        let statistics = show_income_statistics(
            &allocation.daily_income,
            &allocation.sales_income,
            &allocation.client_income,
        );
        let forecasts = generate_forecasts(
            &allocation.daily_income,
            &inputs.products,
            &holdings,
            &inputs.trades,
            params.end_date,
            &params.forecast,
        )?;
        let sales_breakdowns = generate_sales_person_breakdowns(&allocation.daily_income);
        let client_breakdowns = generate_client_breakdowns(&allocation.daily_income);

        let snap = Self {
            id: Uuid::new_v4(),
            built_at: Utc::now(),
            params: *params,
            trade_count: inputs.trades.len(),
            holdings,
            allocation,
            cumulative_sales_income,
            cumulative_client_income,
            statistics,
            forecasts,
            sales_breakdowns,
            client_breakdowns,
        };

        let summary = snap.summary();
        info!(
            snapshot_id = %summary.snapshot_id,
            days = summary.days,
            funds = summary.funds,
            clients = summary.clients,
            sales_persons = summary.sales_persons,
            latest_total_income = summary.latest_total_income,
            "engine snapshot built"
        );

        Ok(snap)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn holdings(&self) -> &DailyHoldings {
        &self.holdings
    }

    pub fn allocation(&self) -> &IncomeAllocation {
        &self.allocation
    }

    pub fn cumulative_sales_income(&self) -> &CumulativeIncome {
        &self.cumulative_sales_income
    }

    pub fn cumulative_client_income(&self) -> &CumulativeIncome {
        &self.cumulative_client_income
    }

    pub fn statistics(&self) -> &IncomeStatistics {
        &self.statistics
    }

    pub fn forecasts(&self) -> &Forecasts {
        &self.forecasts
    }

    pub fn sales_breakdowns(&self) -> &SalesBreakdowns {
        &self.sales_breakdowns
    }

    pub fn client_breakdowns(&self) -> &ClientBreakdowns {
        &self.client_breakdowns
    }

    pub fn summary(&self) -> SnapshotSummary {
        let latest = |s: &CumulativeIncome| s.values().next_back().map_or(0, BTreeMap::len);
        SnapshotSummary {
            snapshot_id: self.id,
            built_at: self.built_at,
            start_date: self.params.start_date,
            end_date: self.params.end_date,
            days: self.holdings.len(),
            funds: self.statistics.fund_stats.len(),
            clients: latest(&self.allocation.client_income),
            sales_persons: latest(&self.allocation.sales_income),
            trades: self.trade_count,
            latest_total_income: self
                .allocation
                .daily_income
                .totals()
                .values()
                .next_back()
                .copied()
                .unwrap_or(0.0),
        }
    }

    // -----------------------------------------------------------------------
    // Report views
    // -----------------------------------------------------------------------

    pub fn dashboard(&self) -> DashboardView {
        views::dashboard_view(&self.allocation, &self.statistics)
    }

    pub fn sales(&self) -> SalesView {
        views::sales_view(&self.allocation.sales_income, &self.sales_breakdowns)
    }

    pub fn clients(&self) -> Vec<ClientIncome> {
        views::clients_view(&self.allocation.client_income)
    }

    pub fn funds(&self) -> Result<BTreeMap<String, IncomeStats>, ViewError> {
        views::funds_view(&self.statistics)
    }

    pub fn forecast(&self) -> &Forecasts {
        &self.forecasts
    }
}

//! Scenario: one account, one fund, one buy, end to end through the pipeline.
//!
//! Initial holdings {AccountA: {FundX: 100}}, a +50 trade on day 2, FundX
//! accrues 0.01 per unit per day.
//!
//! Expected:
//! - holdings: day 1 = 100, day 2 = 150
//! - income:   day 1 = 1.0, day 2 = 1.5
//! - cumulative (client and sales-person): day 2 = 2.5

use approx::assert_relative_eq;
use chrono::NaiveDate;
use kpi_engine::{
    calculate_cumulative_income, calculate_daily_holdings, calculate_daily_income, positions,
    AssignmentTable, EngineInputs, EngineParams, EngineSnapshot, ProductCatalog, ProductInfo,
    Trade,
};

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
}

fn inputs() -> EngineInputs {
    let mut assignments = AssignmentTable::new();
    assignments.insert("AccountA", "ClientA", "Sam");
    EngineInputs {
        initial_holdings: positions([("AccountA", "FundX", 100.0)]),
        trades: vec![Trade::new(day(2), "AccountA", "FundX", 50.0)],
        products: [ProductInfo::daily("FundX", 0.01)].into_iter().collect(),
        assignments,
    }
}

#[test]
fn holdings_roll_forward_through_trade() {
    let inp = inputs();
    let h = calculate_daily_holdings(&inp.initial_holdings, &inp.trades, day(1), day(2)).unwrap();

    assert_eq!(h.len(), 2);
    assert_eq!(h.quantity(day(1), "AccountA", "FundX"), 100.0);
    assert_eq!(h.quantity(day(2), "AccountA", "FundX"), 150.0);
}

#[test]
fn income_is_quantity_times_rate() {
    let inp = inputs();
    let h = calculate_daily_holdings(&inp.initial_holdings, &inp.trades, day(1), day(2)).unwrap();
    let alloc = calculate_daily_income(&h, &inp.products, &inp.assignments).unwrap();

    let by_client_fund = alloc.daily_income.by_client_fund();
    assert_relative_eq!(by_client_fund[&day(1)]["ClientA"]["FundX"], 1.0, epsilon = 1e-12);
    assert_relative_eq!(by_client_fund[&day(2)]["ClientA"]["FundX"], 1.5, epsilon = 1e-12);
    assert_relative_eq!(alloc.sales_income[&day(2)]["Sam"], 1.5, epsilon = 1e-12);
    assert_relative_eq!(alloc.client_income[&day(1)]["ClientA"], 1.0, epsilon = 1e-12);
}

#[test]
fn cumulative_reaches_two_and_a_half() {
    let inp = inputs();
    let h = calculate_daily_holdings(&inp.initial_holdings, &inp.trades, day(1), day(2)).unwrap();
    let alloc = calculate_daily_income(&h, &inp.products, &inp.assignments).unwrap();

    let cum_client = calculate_cumulative_income(&alloc.client_income);
    let cum_sales = calculate_cumulative_income(&alloc.sales_income);
    assert_relative_eq!(cum_client[&day(1)]["ClientA"], 1.0, epsilon = 1e-12);
    assert_relative_eq!(cum_client[&day(2)]["ClientA"], 2.5, epsilon = 1e-12);
    assert_relative_eq!(cum_sales[&day(2)]["Sam"], 2.5, epsilon = 1e-12);
}

#[test]
fn snapshot_exposes_the_same_numbers() {
    let snap = EngineSnapshot::build(&inputs(), &EngineParams::new(day(1), day(2))).unwrap();

    assert_relative_eq!(
        snap.cumulative_client_income()[&day(2)]["ClientA"],
        2.5,
        epsilon = 1e-12
    );

    let dash = snap.dashboard();
    assert_relative_eq!(dash.total_income, 1.5, epsilon = 1e-12);
    assert_eq!(dash.total_clients, 1);
    assert_eq!(dash.total_funds, 1);
    assert_eq!(dash.total_sales, 1);
    assert_eq!(dash.income_trend.len(), 2);
    assert_eq!(dash.income_trend[0].date, day(1));

    let summary = snap.summary();
    assert_eq!(summary.days, 2);
    assert_eq!(summary.trades, 1);
    assert_eq!(summary.snapshot_id, snap.id());
}

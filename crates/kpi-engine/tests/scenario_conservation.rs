//! Scenario: income conservation across every view
//!
//! # Invariants under test
//!
//! 1. For every date, Σ fund income == Σ sales-person income == Σ client
//!    income (within floating-point tolerance).
//! 2. Sales-person and client breakdowns regroup the same cells: their sums
//!    match the per-date total.
//! 3. Every date of the period carries a key in every view.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use kpi_engine::{
    calculate_daily_holdings, calculate_daily_income, generate_client_breakdowns,
    generate_sales_person_breakdowns, positions, AssignmentTable, IncomeAllocation,
    ProductCatalog, ProductInfo, Trade,
};

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, n).unwrap()
}

fn allocation() -> IncomeAllocation {
    let initial = positions([
        ("ACC1", "BOND", 1_000.0),
        ("ACC1", "EQTY", 250.0),
        ("ACC2", "BOND", 400.0),
        ("ACC3", "MMF", 10_000.0),
        ("GHOST", "EQTY", 75.0),
    ]);
    let trades = vec![
        Trade::new(day(2), "ACC1", "BOND", -300.0),
        Trade::new(day(3), "ACC2", "EQTY", 120.0),
        Trade::new(day(3), "ACC3", "MMF", -2_500.0),
        Trade::new(day(5), "NEWACC", "BOND", 50.0),
        Trade::new(day(6), "ACC2", "BOND", -400.0),
    ];
    let products: ProductCatalog = [
        ProductInfo::annual("BOND", 0.045, 365),
        ProductInfo::annual("EQTY", 0.012, 360),
        ProductInfo::daily("MMF", 0.0001),
    ]
    .into_iter()
    .collect();

    let mut assignments = AssignmentTable::new();
    assignments.insert("ACC1", "Acme", "Alice");
    assignments.insert("ACC2", "Beta", "Alice");
    assignments.insert("ACC3", "Acme", "Bob");

    let h = calculate_daily_holdings(&initial, &trades, day(1), day(7)).unwrap();
    calculate_daily_income(&h, &products, &assignments).unwrap()
}

fn sum(m: &std::collections::BTreeMap<String, f64>) -> f64 {
    m.values().sum()
}

#[test]
fn fund_sales_and_client_totals_agree_every_day() {
    let alloc = allocation();
    let by_fund = alloc.daily_income.by_fund();
    let totals = alloc.daily_income.totals();

    assert_eq!(by_fund.len(), 7);
    assert_eq!(alloc.sales_income.len(), 7);
    assert_eq!(alloc.client_income.len(), 7);

    for (date, total) in &totals {
        let f = sum(&by_fund[date]);
        let s = sum(&alloc.sales_income[date]);
        let c = sum(&alloc.client_income[date]);
        assert_relative_eq!(f, *total, epsilon = 1e-9);
        assert_relative_eq!(s, f, epsilon = 1e-9);
        assert_relative_eq!(c, f, epsilon = 1e-9);
    }
}

#[test]
fn client_fund_nesting_sums_to_total() {
    let alloc = allocation();
    let nested = alloc.daily_income.by_client_fund();
    let totals = alloc.daily_income.totals();

    for (date, clients) in &nested {
        let s: f64 = clients.values().map(sum).sum();
        assert_relative_eq!(s, totals[date], epsilon = 1e-9);
    }
}

#[test]
fn breakdowns_preserve_totals() {
    let alloc = allocation();
    let totals = alloc.daily_income.totals();
    let sales = generate_sales_person_breakdowns(&alloc.daily_income);
    let clients = generate_client_breakdowns(&alloc.daily_income);

    assert_eq!(sales.len(), totals.len());
    assert_eq!(clients.len(), totals.len());

    for (date, total) in &totals {
        let by_client: f64 = sales[date].values().map(|b| sum(&b.clients)).sum();
        let by_fund: f64 = sales[date].values().map(|b| sum(&b.funds)).sum();
        assert_relative_eq!(by_client, *total, epsilon = 1e-9);
        assert_relative_eq!(by_fund, *total, epsilon = 1e-9);

        for (person, b) in &sales[date] {
            assert_relative_eq!(b.total(), alloc.sales_income[date][person], epsilon = 1e-9);
        }

        let nested: f64 = clients[date].values().map(sum).sum();
        assert_relative_eq!(nested, *total, epsilon = 1e-9);
    }
}

#[test]
fn alice_covers_two_clients() {
    let alloc = allocation();
    let sales = generate_sales_person_breakdowns(&alloc.daily_income);
    let alice = &sales[&day(3)]["Alice"];

    assert!(alice.clients.contains_key("Acme"));
    assert!(alice.clients.contains_key("Beta"));
    assert!(alice.funds.contains_key("EQTY"));
    assert!(!alice.funds.contains_key("MMF"));
}

//! Scenario: CSV source tables
//!
//! # Invariants under test
//!
//! 1. Headers are matched case-insensitively, in any order, BOM tolerated.
//! 2. Blank lines are skipped.
//! 3. Product rates come from `daily_rate`, else `annual_rate / day_basis`.
//! 4. Missing columns, bad values and duplicate keys are fatal and carry
//!    the offending line number.
//! 5. `load_inputs` assembles all four tables from disk.

use std::{fs, path::Path};

use chrono::NaiveDate;
use kpi_data::{
    load_inputs, load_trades, parse_client_sales, parse_initial_holdings, parse_product_info,
    parse_trades, DataPaths, LoadError,
};
use kpi_engine::{PositionKey, IncomeRate};

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn holdings_headers_are_case_insensitive_and_bom_tolerant() {
    let map = parse_initial_holdings("\u{feff}Fund, QUANTITY ,Account\nX,100,A\n\nY,-5.5,B\n").unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map[&PositionKey::new("A", "X")], 100.0);
    assert_eq!(map[&PositionKey::new("B", "Y")], -5.5);
}

#[test]
fn duplicate_holding_is_rejected_with_line() {
    let err = parse_initial_holdings("account,fund,quantity\nA,X,1\nA,Y,2\nA,X,3\n").unwrap_err();
    assert!(matches!(err, LoadError::DuplicateKey { .. }), "{err}");
    assert_eq!(err.line(), Some(4));
}

#[test]
fn missing_column_is_reported_by_name() {
    let err = parse_client_sales("account,client\nA,Acme\n").unwrap_err();
    match err {
        LoadError::MissingColumn { column, .. } => assert_eq!(column, "sales_person"),
        other => panic!("unexpected: {other}"),
    }
}

#[test]
fn unparseable_quantity_points_at_its_line() {
    let err = parse_trades("date,account,fund,quantity\n2024-01-02,A,X,10\n2024-01-03,A,X,ten\n")
        .unwrap_err();
    assert!(matches!(err, LoadError::InvalidRow { .. }), "{err}");
    assert_eq!(err.line(), Some(3));
    assert_eq!(err.table(), "trade log");
}

#[test]
fn unknown_side_is_rejected() {
    let err = parse_trades("date,account,fund,quantity,side\n2024-01-02,A,X,10,HOLD\n").unwrap_err();
    assert!(err.to_string().contains("HOLD"), "{err}");
}

#[test]
fn product_rates_resolve_daily_then_annual() {
    let catalog = parse_product_info(
        "fund,name,daily_rate,annual_rate,day_basis\n\
         BOND,Bond Fund,0.0002,,\n\
         EQTY,,,0.0365,\n\
         MMF,Money Market,,0.036,360\n",
    )
    .unwrap();

    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.daily_rate("BOND"), Some(0.0002));
    assert!((catalog.daily_rate("EQTY").unwrap() - 0.0001).abs() < 1e-15);
    assert!((catalog.daily_rate("MMF").unwrap() - 0.0001).abs() < 1e-15);
    assert_eq!(catalog.get("BOND").unwrap().name.as_deref(), Some("Bond Fund"));
    assert_eq!(catalog.get("EQTY").unwrap().name, None);
    assert_eq!(
        catalog.get("MMF").unwrap().rate,
        IncomeRate::Annual {
            rate: 0.036,
            day_basis: 360
        }
    );
}

#[test]
fn product_without_any_rate_column_is_rejected() {
    let err = parse_product_info("fund,name\nBOND,Bond\n").unwrap_err();
    assert!(matches!(err, LoadError::MissingColumn { .. }));
}

#[test]
fn product_row_without_rate_value_is_rejected() {
    let err = parse_product_info("fund,daily_rate\nBOND,0.1\nEQTY,\n").unwrap_err();
    assert_eq!(err.line(), Some(3));
}

#[test]
fn duplicate_account_in_client_list_is_rejected() {
    let err = parse_client_sales(
        "account,client,sales_person\nA1,Acme,Alice\nA2,Beta,Bob\nA1,Gamma,Carol\n",
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::DuplicateKey { ref key, .. } if key == "A1"));
}

#[test]
fn missing_file_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_trades(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, LoadError::Open { .. }));
}

#[test]
fn load_inputs_reads_all_tables() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "holdings.csv", "account,fund,quantity\nAccountA,FundX,100\n");
    write(
        dir.path(),
        "trades.csv",
        "date,account,fund,quantity\n2024-01-02,AccountA,FundX,50\n",
    );
    write(dir.path(), "products.csv", "fund,daily_rate\nFundX,0.01\n");
    write(
        dir.path(),
        "clients.csv",
        "account,client,sales_person\nAccountA,Acme,Alice\n",
    );

    let paths = DataPaths {
        initial_holdings: "holdings.csv".into(),
        trades: "trades.csv".into(),
        product_info: "products.csv".into(),
        client_list: "clients.csv".into(),
    }
    .resolved_against(dir.path());

    let inputs = load_inputs(&paths).unwrap();
    assert_eq!(inputs.initial_holdings.len(), 1);
    assert_eq!(inputs.trades.len(), 1);
    assert_eq!(inputs.trades[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    assert_eq!(inputs.products.daily_rate("FundX"), Some(0.01));
    assert_eq!(inputs.assignments.resolve("AccountA"), ("Acme", "Alice"));
}

//! Registry of config sections read by the engine, the daemon and the CLI.
//!
//! Entries are JSON-pointer prefixes. A leaf under any prefix is consumed;
//! anything else shows up in the unused-key report.
//!
//! Observed reads:
//! - `KpiConfig::period`   -> /period/start_date, /period/end_date
//! - `KpiConfig::data`     -> /data/{initial_holdings,trades,product_info,client_list}
//! - `KpiConfig::forecast` -> /forecast/horizon_days, /forecast/trend_window_days
//! - `KpiConfig::server`   -> /server/addr

pub const CONSUMED_POINTERS: &[&str] = &[
    "/period/start_date",
    "/period/end_date",
    "/data/initial_holdings",
    "/data/trades",
    "/data/product_info",
    "/data/client_list",
    "/forecast/horizon_days",
    "/forecast/trend_window_days",
    "/server/addr",
];

pub fn consumed_pointers() -> &'static [&'static str] {
    CONSUMED_POINTERS
}

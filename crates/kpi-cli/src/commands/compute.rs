//! `kpi compute`: full pipeline, one view out.

use anyhow::Result;
use serde_json::json;

use super::{build_snapshot, print_json, resolve_config, ConfigArgs, View};

pub fn run(args: &ConfigArgs, view: View) -> Result<()> {
    let config = resolve_config(args)?;
    let snap = build_snapshot(&config, &config.engine_params())?;

    match view {
        View::Summary => print_json(&json!({
            "config_hash": config.config_hash(),
            "summary": snap.summary(),
        })),
        View::Dashboard => print_json(&snap.dashboard()),
        View::Sales => print_json(&snap.sales()),
        View::Clients => print_json(&snap.clients()),
        View::Funds => print_json(&snap.funds()?),
        View::Forecast => print_json(snap.forecast()),
    }
}

//! `kpi stats`: descriptive statistics for one grouping.

use anyhow::Result;

use super::{build_snapshot, print_json, resolve_config, ConfigArgs, StatsGroup};

pub fn run(args: &ConfigArgs, group: StatsGroup) -> Result<()> {
    let config = resolve_config(args)?;
    let snap = build_snapshot(&config, &config.engine_params())?;
    let stats = snap.statistics();

    let table = match group {
        StatsGroup::Fund => &stats.fund_stats,
        StatsGroup::Client => &stats.client_stats,
        StatsGroup::Sales => &stats.sales_stats,
    };
    print_json(table)
}

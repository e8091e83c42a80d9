//! `kpi forecast`: projection with optional horizon/window overrides.

use anyhow::Result;
use tracing::info;

use super::{build_snapshot, print_json, resolve_config, ConfigArgs};

pub fn run(args: &ConfigArgs, horizon: Option<u32>, window: Option<u32>) -> Result<()> {
    let config = resolve_config(args)?;

    let mut forecast = config.settings.forecast;
    if let Some(h) = horizon {
        forecast.horizon_days = h;
    }
    if let Some(w) = window {
        forecast.trend_window_days = w;
    }
    info!(
        horizon_days = forecast.horizon_days,
        trend_window_days = forecast.trend_window_days,
        "forecast parameters"
    );

    let params = config.engine_params().with_forecast(forecast);
    let snap = build_snapshot(&config, &params)?;
    print_json(snap.forecast())
}

//! Command handler modules for the `kpi` CLI.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod compute;
pub mod forecast;
pub mod stats;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use kpi_config::{config_paths_from_env, load_kpi_config, ResolvedConfig, UnusedKeyPolicy};
use kpi_data::load_inputs;
use kpi_engine::{EngineParams, EngineSnapshot};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Shared arguments
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Layered config paths in merge order (default: $KPI_CONFIG)
    #[arg(long = "config")]
    pub config_paths: Vec<PathBuf>,

    /// Refuse configs that carry keys nothing reads
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Summary,
    Dashboard,
    Sales,
    Clients,
    Funds,
    Forecast,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsGroup {
    Fund,
    Client,
    Sales,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// `--config` paths if given, else `KPI_CONFIG`, else none (defaults only).
pub fn config_paths(args: &ConfigArgs) -> Vec<PathBuf> {
    if args.config_paths.is_empty() {
        config_paths_from_env().unwrap_or_default()
    } else {
        args.config_paths.clone()
    }
}

pub fn resolve_config(args: &ConfigArgs) -> Result<ResolvedConfig> {
    let policy = if args.strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    load_kpi_config(&config_paths(args), policy)
}

/// Load the source tables named by `config` and run the engine with `params`.
pub fn build_snapshot(config: &ResolvedConfig, params: &EngineParams) -> Result<EngineSnapshot> {
    let inputs = load_inputs(&config.data_paths).context("failed to load source tables")?;
    EngineSnapshot::build(&inputs, params).context("engine snapshot build failed")
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output json failed")?;
    println!("{json}");
    Ok(())
}

//! Typed settings over the merged config tree.

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use kpi_data::DataPaths;
use kpi_engine::{EngineParams, ForecastParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{load_layered_yaml, report_unused_keys, LoadedConfig, UnusedKeyPolicy, UnusedKeyReport};

/// Comma-separated list of YAML layers, lowest precedence first.
pub const CONFIG_ENV: &str = "KPI_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub initial_holdings: PathBuf,
    pub trades: PathBuf,
    pub product_info: PathBuf,
    pub client_list: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            initial_holdings: "data/2023DEC.csv".into(),
            trades: "data/TRADES_LOG.csv".into(),
            product_info: "data/PRODUCT_INFO.csv".into(),
            client_list: "data/CLIENT_LIST.csv".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    pub period: PeriodConfig,
    pub data: DataConfig,
    pub forecast: ForecastParams,
    pub server: ServerConfig,
}

impl KpiConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let cfg: KpiConfig =
            serde_json::from_value(config_json.clone()).context("config does not match schema")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.period.start_date > self.period.end_date {
            bail!(
                "CONFIG_INVALID_PERIOD: start_date {} is after end_date {}",
                self.period.start_date,
                self.period.end_date
            );
        }
        Ok(())
    }

    pub fn engine_params(&self) -> EngineParams {
        EngineParams::new(self.period.start_date, self.period.end_date).with_forecast(self.forecast)
    }

    /// Data table locations, relative entries resolved against `base`.
    pub fn data_paths(&self, base: Option<&Path>) -> DataPaths {
        let paths = DataPaths {
            initial_holdings: self.data.initial_holdings.clone(),
            trades: self.data.trades.clone(),
            product_info: self.data.product_info.clone(),
            client_list: self.data.client_list.clone(),
        };
        match base {
            Some(b) => paths.resolved_against(b),
            None => paths,
        }
    }
}

/// Everything a binary needs from its config layers.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub loaded: LoadedConfig,
    pub settings: KpiConfig,
    pub data_paths: DataPaths,
    pub unused: UnusedKeyReport,
}

impl ResolvedConfig {
    pub fn config_hash(&self) -> &str {
        &self.loaded.config_hash
    }

    pub fn engine_params(&self) -> EngineParams {
        self.settings.engine_params()
    }
}

/// Load, hash, lint and type the given layers.
///
/// With no layers the defaults apply and data paths stay relative to the
/// working directory.
pub fn load_kpi_config<P: AsRef<Path>>(paths: &[P], policy: UnusedKeyPolicy) -> Result<ResolvedConfig> {
    let loaded = load_layered_yaml(paths)?;
    let unused = report_unused_keys(&loaded.config_json, policy)?;
    if !unused.is_clean() {
        warn!(keys = ?unused.unused_leaf_pointers, "unused config keys");
    }

    let settings = KpiConfig::from_json(&loaded.config_json)?;
    let data_paths = settings.data_paths(loaded.base_dir.as_deref());

    info!(
        config_hash = %loaded.config_hash,
        layers = paths.len(),
        start_date = %settings.period.start_date,
        end_date = %settings.period.end_date,
        "config loaded"
    );

    Ok(ResolvedConfig {
        loaded,
        settings,
        data_paths,
        unused,
    })
}

/// Layers named by `KPI_CONFIG`, if set and non-empty.
pub fn config_paths_from_env() -> Option<Vec<PathBuf>> {
    let raw = env::var(CONFIG_ENV).ok()?;
    let paths: Vec<PathBuf> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect();
    (!paths.is_empty()).then_some(paths)
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use kpi_config::UnusedKeyPolicy;
use tracing::warn;

mod commands;

use commands::{ConfigArgs, StatsGroup, View};

#[derive(Parser)]
#[command(name = "kpi")]
#[command(about = "Investment income KPI engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a snapshot and print one report view as JSON
    Compute {
        #[command(flatten)]
        config: ConfigArgs,

        /// Which view to print
        #[arg(long, value_enum, default_value_t = View::Summary)]
        view: View,
    },

    /// Print descriptive income statistics for one grouping
    Stats {
        #[command(flatten)]
        config: ConfigArgs,

        #[arg(long, value_enum, default_value_t = StatsGroup::Fund)]
        group: StatsGroup,
    },

    /// Project income past the period end
    Forecast {
        #[command(flatten)]
        config: ConfigArgs,

        /// Days to project (overrides forecast.horizon_days)
        #[arg(long)]
        horizon: Option<u32>,

        /// Trailing history window (overrides forecast.trend_window_days)
        #[arg(long)]
        window: Option<u32>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overlays)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Compute { config, view } => commands::compute::run(&config, view),
        Commands::Stats { config, group } => commands::stats::run(&config, group),
        Commands::Forecast {
            config,
            horizon,
            window,
        } => commands::forecast::run(&config, horizon, window),
        Commands::ConfigHash { paths } => {
            let loaded = kpi_config::load_layered_yaml(&paths)?;
            let unused = kpi_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
            if !unused.is_clean() {
                warn!(keys = ?unused.unused_leaf_pointers, "unused config keys");
            }
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(())
        }
    }
}

/// Logs go to stderr; stdout carries only command output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

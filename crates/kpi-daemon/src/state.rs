//! Shared runtime state for kpi-daemon.
//!
//! The current [`EngineSnapshot`] lives behind `RwLock<Arc<_>>`. Readers clone
//! the `Arc` and drop the lock before shaping a response; recompute builds a
//! complete replacement off the executor and swaps it in one write.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use kpi_data::{load_inputs, DataPaths};
use kpi_engine::{EngineInputs, EngineParams, EngineSnapshot, SnapshotSummary};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{error, info};

// ---------------------------------------------------------------------------
// BusMsg: SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat { ts_millis: i64 },
    SnapshotBuilt(SnapshotSummary),
    LogLine { level: String, msg: String },
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// SnapshotSource
// ---------------------------------------------------------------------------

/// Where a (re)computation gets its inputs.
#[derive(Clone, Debug)]
pub enum SnapshotSource {
    /// Reload the four CSV tables on every build.
    Files {
        paths: DataPaths,
        params: EngineParams,
    },
    /// Rebuild from inputs held in memory.
    InMemory {
        inputs: Box<EngineInputs>,
        params: EngineParams,
    },
}

impl SnapshotSource {
    /// Blocking: reads files for `Files`. Run via `spawn_blocking` on the
    /// executor.
    pub fn build(&self) -> Result<EngineSnapshot> {
        match self {
            SnapshotSource::Files { paths, params } => {
                let inputs = load_inputs(paths).context("failed to load source tables")?;
                EngineSnapshot::build(&inputs, params).context("engine snapshot build failed")
            }
            SnapshotSource::InMemory { inputs, params } => {
                EngineSnapshot::build(inputs, params).context("engine snapshot build failed")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared across all Axum handlers as `Arc<AppState>`.
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    /// Static build metadata.
    pub build: BuildInfo,
    /// Currently served snapshot.
    pub snapshot: RwLock<Arc<EngineSnapshot>>,
    /// Inputs for recompute.
    pub source: Arc<SnapshotSource>,
    /// Serializes concurrent recomputes.
    pub recompute_guard: Mutex<()>,
}

impl AppState {
    /// Build the first snapshot from `source`. Startup fails if it fails.
    pub fn new(source: SnapshotSource) -> Result<Self> {
        let snapshot = source.build().context("initial snapshot build failed")?;
        Ok(Self::with_snapshot(source, snapshot))
    }

    pub fn with_snapshot(source: SnapshotSource, snapshot: EngineSnapshot) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);
        Self {
            bus,
            build: BuildInfo {
                service: "kpi-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            snapshot: RwLock::new(Arc::new(snapshot)),
            source: Arc::new(source),
            recompute_guard: Mutex::new(()),
        }
    }

    /// The snapshot currently served. The lock is released on return.
    pub async fn current(&self) -> Arc<EngineSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Build a fresh snapshot and swap it in.
    ///
    /// On failure the previous snapshot keeps being served and an `ERROR`
    /// log line goes out on the bus.
    pub async fn recompute(&self) -> Result<SnapshotSummary> {
        let _guard = self.recompute_guard.lock().await;

        let source = Arc::clone(&self.source);
        let built = tokio::task::spawn_blocking(move || source.build())
            .await
            .context("recompute task panicked")
            .and_then(|r| r);

        match built {
            Ok(snap) => {
                let summary = snap.summary();
                *self.snapshot.write().await = Arc::new(snap);
                info!(snapshot_id = %summary.snapshot_id, "snapshot swapped");
                let _ = self.bus.send(BusMsg::SnapshotBuilt(summary.clone()));
                Ok(summary)
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "recompute failed; keeping previous snapshot");
                let _ = self.bus.send(BusMsg::LogLine {
                    level: "ERROR".to_string(),
                    msg: format!("recompute failed: {e:#}"),
                });
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seconds since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}

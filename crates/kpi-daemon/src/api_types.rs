//! Response bodies owned by the daemon itself.
//!
//! Report views are serialized straight from `kpi_engine::views`; only the
//! service envelopes live here.

use kpi_engine::SnapshotSummary;
use serde::Serialize;

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// /v1/status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub daemon_uptime_secs: u64,
    #[serde(flatten)]
    pub snapshot: SnapshotSummary,
}

// ---------------------------------------------------------------------------
// /api/test
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TestResponse {
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Body of every 5xx response: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

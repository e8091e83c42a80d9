//! Axum router and all HTTP handlers for kpi-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Report handlers take the current snapshot `Arc`, release
//! the lock, and serialize one view.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info};

use crate::{
    api_types::{ErrorResponse, HealthResponse, StatusResponse, TestResponse},
    state::{uptime_secs, AppState, BusMsg},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/dashboard", get(dashboard))
        .route("/api/sales", get(sales))
        .route("/api/clients", get(clients))
        .route("/api/funds", get(funds))
        .route("/api/forecast", get(forecast))
        .route("/api/test", get(api_test))
        .route("/v1/health", get(health))
        .route("/v1/status", get(status_handler))
        .route("/v1/recompute", post(recompute))
        .route("/v1/stream", get(stream))
        .with_state(state)
}

fn internal_error(msg: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: msg }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Report views
// ---------------------------------------------------------------------------

pub(crate) async fn dashboard(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = st.current().await;
    Json(snap.dashboard())
}

pub(crate) async fn sales(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = st.current().await;
    Json(snap.sales())
}

pub(crate) async fn clients(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = st.current().await;
    Json(snap.clients())
}

/// Malformed statistics become a 500 with an `{error}` body.
pub(crate) async fn funds(State(st): State<Arc<AppState>>) -> Response {
    let snap = st.current().await;
    match snap.funds() {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => {
            error!(snapshot_id = %snap.id(), error = %e, "funds view failed");
            internal_error(e.to_string())
        }
    }
}

pub(crate) async fn forecast(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = st.current().await;
    Json(snap.forecast().clone())
}

pub(crate) async fn api_test() -> impl IntoResponse {
    Json(TestResponse {
        message: "API is working",
    })
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

pub(crate) async fn status_handler(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = st.current().await;
    (
        StatusCode::OK,
        Json(StatusResponse {
            daemon_uptime_secs: uptime_secs(),
            snapshot: snap.summary(),
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /v1/recompute
// ---------------------------------------------------------------------------

/// Rebuild the snapshot from its source. The old snapshot stays live on
/// failure.
pub(crate) async fn recompute(State(st): State<Arc<AppState>>) -> Response {
    info!("recompute requested");
    match st.recompute().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => internal_error(format!("{e:#}")),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::SnapshotBuilt(_) => "snapshot",
                    BusMsg::LogLine { .. } => "log",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}

//! REST API for simulation state and telemetry.
//!
//! Provides two GET endpoints:
//! - `/state`: simulation config, wiring scheme, KPI report and latest step
//! - `/telemetry`: full step results with optional range filtering

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::sim::kpi::KpiReport;
use crate::sim::types::{SimConfig, StepResult};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the simulation run completes and wrapped in
/// `Arc`; all data is read-only.
pub struct AppState {
    /// Simulation configuration used for this run.
    pub config: SimConfig,
    /// Relay wiring scheme the controller resolved.
    pub relay_mode: String,
    /// Aggregate KPI report.
    pub kpi: KpiReport,
    /// Per-step simulation results.
    pub results: Vec<StepResult>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/telemetry", get(handlers::get_telemetry))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind to `addr` or the
/// server stops with an error.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}

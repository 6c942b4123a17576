//! API response and query types.
//!
//! Field names follow the CSV export columns.

use serde::{Deserialize, Serialize};

use crate::control::Health;
use crate::sim::kpi::KpiReport;
use crate::sim::types::{SimConfig, StepResult};

/// Combined state response: config, KPIs, and latest telemetry record.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub config: SimConfig,
    pub relay_mode: String,
    pub kpi: KpiReport,
    /// Most recent telemetry record, absent if the run had no steps.
    pub latest_step: Option<TelemetryRecord>,
}

/// Single telemetry record.
///
/// Levels are reported both as numeric code and display name.
#[derive(Debug, Serialize)]
pub struct TelemetryRecord {
    pub timestep: usize,
    pub time_hr: f32,
    pub production_level: u8,
    pub production_name: &'static str,
    pub consumption_level: u8,
    pub consumption_name: &'static str,
    /// Grid power (W; positive=import, negative=export).
    pub grid_w: i32,
    pub household_w: i32,
    pub pv_available_w: i32,
    pub pv_active_w: i32,
    pub pv_hardware_w: i32,
    /// Aggregate PV limit, `null` while unrestricted.
    pub pv_limit_sum_w: Option<i32>,
    pub evcs_count: u32,
    /// EVCS budget (W, `-1` = unlimited).
    pub evcs_budget_w: i32,
    pub evcs_active_w: i32,
    pub health: Health,
}

impl From<&StepResult> for TelemetryRecord {
    fn from(r: &StepResult) -> Self {
        Self {
            timestep: r.timestep,
            time_hr: r.time_hr,
            production_level: r.production.code(),
            production_name: r.production.name(),
            consumption_level: r.consumption.code(),
            consumption_name: r.consumption.name(),
            grid_w: r.grid_w,
            household_w: r.household_w,
            pv_available_w: r.pv_available_w,
            pv_active_w: r.pv_active_w,
            pv_hardware_w: r.pv_hardware_w,
            pv_limit_sum_w: r.pv_limit_sum_w,
            evcs_count: r.evcs_count,
            evcs_budget_w: r.evcs_budget_w,
            evcs_active_w: r.evcs_active_w,
            health: r.health,
        }
    }
}

/// Optional range query parameters for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// Start timestep (inclusive).
    pub from: Option<usize>,
    /// End timestep (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

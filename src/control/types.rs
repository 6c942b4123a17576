//! Entries, per-cycle snapshot, and published status of the controller.

use serde::Serialize;

use super::distribution::ClusterAllowance;
use super::level::{ConsumptionLevel, ProductionLevel};

/// One configured PV inverter as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PvInverterEntry {
    pub id: String,
    /// Static hardware maximum in watts.
    pub hardware_max_w: i32,
    /// Active power reported this cycle, `None` if undefined.
    pub active_power_w: Option<i32>,
    /// Limit written in the previous cycle.
    pub last_applied_limit_w: Option<i32>,
}

impl PvInverterEntry {
    pub fn new(id: impl Into<String>, hardware_max_w: i32) -> Self {
        Self {
            id: id.into(),
            hardware_max_w: hardware_max_w.max(0),
            active_power_w: None,
            last_applied_limit_w: None,
        }
    }

    pub fn with_active_power(mut self, active_power_w: i32) -> Self {
        self.active_power_w = Some(active_power_w);
        self
    }
}

/// One configured EVCS cluster as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvcsClusterEntry {
    pub id: String,
    pub active_power_w: Option<i32>,
    pub evcs_count: Option<u32>,
}

impl EvcsClusterEntry {
    pub fn new(id: impl Into<String>, active_power_w: i32, evcs_count: u32) -> Self {
        Self {
            id: id.into(),
            active_power_w: Some(active_power_w),
            evcs_count: Some(evcs_count),
        }
    }
}

/// Everything one control cycle reads, captured once at the start of the cycle.
///
/// Cluster order is the insertion order and must stay stable across a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub production: ProductionLevel,
    pub consumption: ConsumptionLevel,
    /// Signed grid power: positive imports, negative exports.
    pub grid_active_power_w: Option<i32>,
    pub inverters: Vec<PvInverterEntry>,
    pub clusters: Vec<EvcsClusterEntry>,
}

/// Run health, escalating within a cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    #[default]
    Ok,
    /// Undefined telemetry or configuration fallback.
    Warning,
    /// A collaborator rejected a written value.
    Fault,
}

impl Health {
    /// Raises `self` to `other` if `other` is worse.
    pub fn escalate(&mut self, other: Health) {
        *self = (*self).max(other);
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Fault => "fault",
        }
    }
}

/// Limit written to a single inverter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InverterLimit {
    pub id: String,
    pub limit_w: i32,
}

/// Observable status published after each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleOutput {
    pub production: ProductionLevel,
    pub consumption: ConsumptionLevel,
    pub pv_active_power_sum_w: i32,
    pub pv_hardware_max_sum_w: i32,
    /// Aggregate PV limit, `None` while production is unrestricted.
    pub pv_limit_sum_w: Option<i32>,
    pub pv_limits: Vec<InverterLimit>,
    pub evcs_count: u32,
    /// Total cluster budget, `-1` for unlimited.
    pub evcs_clusters_allowed_power_w: i32,
    pub cluster_allowances: Vec<ClusterAllowance>,
    pub health: Health,
}

//! Post-hoc KPI computation from simulation results.

use std::fmt;

use serde::Serialize;

use crate::control::Health;

use super::types::StepResult;

/// Aggregate key performance indicators derived from a complete simulation run.
///
/// Computed post-hoc from `Vec<StepResult>` to ensure consistency between
/// step data and reported metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    /// Steps with production management below Full.
    pub production_restricted_steps: usize,
    /// Steps with consumption management below Full.
    pub consumption_restricted_steps: usize,
    /// PV energy produced (kWh).
    pub pv_energy_kwh: f32,
    /// PV energy available but withheld by the limit (kWh).
    pub pv_curtailed_kwh: f32,
    /// Energy drawn by EVCS clusters (kWh).
    pub evcs_energy_kwh: f32,
    /// Peak grid import (kW, positive).
    pub peak_import_kw: f32,
    /// Peak grid export (kW, positive magnitude).
    pub peak_export_kw: f32,
    /// Steps that ended with health Warning or Fault.
    pub degraded_steps: usize,
    /// Steps that ended with health Fault.
    pub fault_steps: usize,
}

impl KpiReport {
    /// Computes all KPIs from the complete step record vector.
    ///
    /// # Arguments
    ///
    /// * `results` - Complete simulation step results
    /// * `dt_hours` - Timestep duration in hours
    pub fn from_results(results: &[StepResult], dt_hours: f32) -> Self {
        let kwh = |w: i32| w as f32 * dt_hours / 1000.0;

        let mut report = Self {
            production_restricted_steps: 0,
            consumption_restricted_steps: 0,
            pv_energy_kwh: 0.0,
            pv_curtailed_kwh: 0.0,
            evcs_energy_kwh: 0.0,
            peak_import_kw: 0.0,
            peak_export_kw: 0.0,
            degraded_steps: 0,
            fault_steps: 0,
        };

        for r in results {
            if r.production.is_limiting() {
                report.production_restricted_steps += 1;
            }
            if r.evcs_budget_w >= 0 {
                report.consumption_restricted_steps += 1;
            }
            report.pv_energy_kwh += kwh(r.pv_active_w);
            report.pv_curtailed_kwh += kwh(r.curtailed_w());
            report.evcs_energy_kwh += kwh(r.evcs_active_w);

            let grid_kw = r.grid_w as f32 / 1000.0;
            report.peak_import_kw = report.peak_import_kw.max(grid_kw);
            report.peak_export_kw = report.peak_export_kw.max(-grid_kw);

            if r.health != Health::Ok {
                report.degraded_steps += 1;
            }
            if r.health == Health::Fault {
                report.fault_steps += 1;
            }
        }

        report
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Production restricted:  {} steps", self.production_restricted_steps)?;
        writeln!(f, "Consumption restricted: {} steps", self.consumption_restricted_steps)?;
        writeln!(f, "PV energy:              {:.2} kWh", self.pv_energy_kwh)?;
        writeln!(f, "PV curtailed:           {:.2} kWh", self.pv_curtailed_kwh)?;
        writeln!(f, "EVCS energy:            {:.2} kWh", self.evcs_energy_kwh)?;
        writeln!(f, "Peak import:            {:.2} kW", self.peak_import_kw)?;
        writeln!(f, "Peak export:            {:.2} kW", self.peak_export_kw)?;
        write!(
            f,
            "Degraded steps:         {} ({} faults)",
            self.degraded_steps, self.fault_steps
        )
    }
}

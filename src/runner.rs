//! Scenario assembly: turns a [`ScenarioConfig`] into a running engine.

use tracing::info;

use crate::config::ScenarioConfig;
use crate::control::{Para14aController, RelayWiringScheme};
use crate::devices::{
    Household, RelayBoard, RelayWindow, SessionProfile, SimEvcsCluster, SimPvInverter,
};
use crate::sim::engine::Engine;
use crate::sim::kpi::KpiReport;
use crate::sim::types::{SimConfig, StepResult};

/// Everything a completed run produces.
pub struct SimulationRun {
    pub config: SimConfig,
    /// Wiring scheme the controller resolved at activation.
    pub scheme: RelayWiringScheme,
    pub results: Vec<StepResult>,
    pub kpi: KpiReport,
}

/// Builds the engine for a validated scenario.
///
/// Each device gets its own seed derived from the master seed so that adding
/// a device does not change the draws of the others.
///
/// # Panics
///
/// Panics if the scenario has not passed [`ScenarioConfig::validate`].
pub fn build_engine(scenario: &ScenarioConfig) -> Engine {
    let s = &scenario.simulation;
    let config = SimConfig::new(s.steps_per_day, s.days, s.seed);

    let controller = Para14aController::new(scenario.controller.settings());

    let windows = scenario
        .relay_schedule
        .iter()
        .map(|w| {
            RelayWindow::new(w.start_step, w.end_step, w.closed.clone())
                .with_undefined(w.undefined.clone())
        })
        .collect();
    let relays = RelayBoard::new(scenario.controller.relay_inputs.iter().cloned(), windows);

    let h = &scenario.household;
    let household = Household::new(
        h.base_w,      /* base_w */
        h.amp_w,       /* amp_w */
        h.phase_rad,   /* phase_rad */
        h.noise_std_w, /* noise_std_w */
        &config,
        s.seed,
    );

    let inverters = scenario
        .pv_inverters
        .iter()
        .enumerate()
        .map(|(i, pv)| {
            let mut inverter = SimPvInverter::new(
                pv.id.clone(),
                pv.hardware_max_w,
                pv.peak_w,
                pv.sunrise_idx,
                pv.sunset_idx,
                pv.noise_std,
                &config,
                s.seed.wrapping_add(1 + i as u64),
            );
            inverter.reject_writes = pv.reject_writes;
            inverter
        })
        .collect();

    let cluster_seed_base = s.seed.wrapping_add(1 + scenario.pv_inverters.len() as u64);
    let clusters = scenario
        .evcs_clusters
        .iter()
        .enumerate()
        .map(|(i, ev)| {
            let profile = SessionProfile {
                max_charge_w: ev.max_charge_w,
                demand_wh_min: ev.demand_wh_min,
                demand_wh_max: ev.demand_wh_max,
                dwell_steps_min: ev.dwell_steps_min,
                dwell_steps_max: ev.dwell_steps_max,
            };
            SimEvcsCluster::new(
                ev.id.clone(),
                ev.stations,
                profile,
                &config,
                cluster_seed_base.wrapping_add(i as u64),
            )
        })
        .collect();

    Engine::new(config, controller, relays, household, inverters, clusters)
        .with_meter_dropouts(s.meter_dropouts.clone())
}

/// Runs a validated scenario to completion and computes its KPIs.
///
/// The controller is deactivated once the last step has run.
pub fn run_scenario(scenario: &ScenarioConfig) -> SimulationRun {
    let mut engine = build_engine(scenario);
    info!(
        steps = engine.config().total_steps(),
        inverters = engine.inverters().len(),
        clusters = engine.clusters().len(),
        "simulation started"
    );
    let results = engine.run();
    engine.shutdown();

    let config = engine.config().clone();
    let scheme = engine.controller().scheme();
    let kpi = KpiReport::from_results(&results, config.dt_hours);
    info!(steps = results.len(), "simulation finished");

    SimulationRun {
        config,
        scheme,
        results,
        kpi,
    }
}

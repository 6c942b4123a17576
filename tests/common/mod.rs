//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use para14a::control::{ControllerSettings, Para14aController};
use para14a::devices::{
    Household, RelayBoard, RelayWindow, SessionProfile, SimEvcsCluster, SimPvInverter,
};
use para14a::sim::engine::Engine;
use para14a::sim::types::SimConfig;

/// Relay channel addresses E1..E4.
pub const INPUTS: [&str; 4] = [
    "io0/InputOutput0",
    "io0/InputOutput1",
    "io0/InputOutput2",
    "io0/InputOutput3",
];

/// Default simulation configuration (96 steps/day, 1 day, seed 42).
pub fn default_config() -> SimConfig {
    SimConfig::new(96, 1, 42)
}

/// Controller wired with `relay_mode` on [`INPUTS`], default smoothing.
pub fn default_controller(relay_mode: &str) -> Para14aController {
    Para14aController::new(ControllerSettings {
        relay_mode: relay_mode.to_string(),
        relay_inputs: INPUTS.iter().map(|s| s.to_string()).collect(),
        ..ControllerSettings::default()
    })
}

/// Relay board on [`INPUTS`] with the given windows.
pub fn relay_board(windows: Vec<RelayWindow>) -> RelayBoard {
    RelayBoard::new(INPUTS.iter().map(|s| s.to_string()), windows)
}

/// Window closing the given relay inputs (0-based: E1 = 0).
pub fn closed(start_step: usize, end_step: usize, inputs: &[usize]) -> RelayWindow {
    RelayWindow::new(
        start_step,
        end_step,
        inputs.iter().map(|&i| INPUTS[i].to_string()).collect(),
    )
}

/// Default household (700 W base, 400 W swing, 30 W noise).
pub fn default_household(config: &SimConfig) -> Household {
    Household::new(700.0, 400.0, 1.2, 30.0, config, 42)
}

/// Default inverter (10 kW hardware, 9 kW peak, sunrise 24, sunset 72).
pub fn default_inverter(id: &str, config: &SimConfig, seed: u64) -> SimPvInverter {
    SimPvInverter::new(id, 10_000, 9_000.0, 24, 72, 0.02, config, seed)
}

/// Default cluster (11 kW stations, 8-25 kWh, 6-30 step dwell).
pub fn default_cluster(
    id: &str,
    stations: usize,
    config: &SimConfig,
    seed: u64,
) -> SimEvcsCluster {
    let profile = SessionProfile {
        max_charge_w: 11_000.0,
        demand_wh_min: 8_000.0,
        demand_wh_max: 25_000.0,
        dwell_steps_min: 6,
        dwell_steps_max: 30,
    };
    SimEvcsCluster::new(id, stations, profile, config, seed)
}

/// Engine with one inverter, one two-station cluster and the given windows.
pub fn default_engine(relay_mode: &str, windows: Vec<RelayWindow>) -> Engine {
    let config = default_config();
    let household = default_household(&config);
    let inverters = vec![default_inverter("pvInverter0", &config, 1)];
    let clusters = vec![default_cluster("evcsCluster0", 2, &config, 2)];
    Engine::new(
        config,
        default_controller(relay_mode),
        relay_board(windows),
        household,
        inverters,
        clusters,
    )
}

/// Engine with one inverter and no EV charging.
pub fn pv_only_engine(relay_mode: &str, windows: Vec<RelayWindow>) -> Engine {
    let config = default_config();
    let household = default_household(&config);
    let inverters = vec![default_inverter("pvInverter0", &config, 1)];
    Engine::new(
        config,
        default_controller(relay_mode),
        relay_board(windows),
        household,
        inverters,
        Vec::new(),
    )
}

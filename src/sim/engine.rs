//! Simulation engine: plays the external scheduler and the device
//! collaborators around a [`Para14aController`].

use tracing::debug;

use crate::control::Para14aController;
use crate::devices::{
    Device, DeviceContext, Household, RelayBoard, SimEvcsCluster, SimGridMeter, SimPvInverter,
};

use super::clock::{Clock, Tick};
use super::power_balance::grid_net_w;
use super::types::{SimConfig, StepResult};

/// Simulation engine owning the controller and every simulated device.
///
/// Holds typed device collections rather than trait objects since the device
/// kinds are fixed.
pub struct Engine {
    config: SimConfig,
    controller: Para14aController,
    relays: RelayBoard,
    meter: SimGridMeter,
    household: Household,
    inverters: Vec<SimPvInverter>,
    clusters: Vec<SimEvcsCluster>,
    meter_dropouts: Vec<(usize, usize)>,
}

impl Engine {
    /// Creates a new simulation engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulation timing
    /// * `controller` - The restriction-mode controller under test
    /// * `relays` - Relay board with its restriction schedule
    /// * `household` - Uncontrolled household load
    /// * `inverters` - PV inverters, in configuration order
    /// * `clusters` - EVCS clusters, in configuration order
    pub fn new(
        config: SimConfig,
        controller: Para14aController,
        relays: RelayBoard,
        household: Household,
        inverters: Vec<SimPvInverter>,
        clusters: Vec<SimEvcsCluster>,
    ) -> Self {
        Self {
            config,
            controller,
            relays,
            meter: SimGridMeter::new("meter0"),
            household,
            inverters,
            clusters,
            meter_dropouts: Vec::new(),
        }
    }

    /// Step windows `[start, end)` during which the grid meter has no value.
    pub fn with_meter_dropouts(mut self, dropouts: Vec<(usize, usize)>) -> Self {
        self.meter_dropouts = dropouts;
        self
    }

    /// Executes one control period.
    ///
    /// Devices settle under the limits written in the previous period, the
    /// meter records the resulting balance, then the controller decodes the
    /// relays and runs its cycle.
    pub fn step(&mut self, tick: Tick) -> StepResult {
        let t = tick.step;
        let context = DeviceContext::new(t);

        // 1. Physical state
        self.relays.advance(t);
        let household_w = self.household.power_w(&context);
        let mut pv_w = 0;
        let mut pv_available_w = 0;
        for inverter in &mut self.inverters {
            pv_w += inverter.power_w(&context);
            pv_available_w += inverter.available_w();
        }
        let evcs_w: i32 = self.clusters.iter_mut().map(|c| c.power_w(&context)).sum();

        // 2. Metering
        let grid_w = grid_net_w(household_w, evcs_w, pv_w);
        let dropped = self
            .meter_dropouts
            .iter()
            .any(|&(start, end)| t >= start && t < end);
        self.meter.record((!dropped).then_some(grid_w));

        // 3. Control cycle
        self.controller.decode_relays(&self.relays);
        let output = self
            .controller
            .run_cycle(&self.meter, &mut self.inverters, &mut self.clusters);

        debug!(
            step = t,
            closed = ?self.relays.closed_channels(),
            grid_w,
            health = output.health.as_str(),
            "step complete"
        );

        StepResult {
            timestep: t,
            time_hr: tick.time_hr,
            production: output.production,
            consumption: output.consumption,
            grid_w,
            household_w,
            pv_available_w,
            pv_active_w: -pv_w,
            pv_hardware_w: output.pv_hardware_max_sum_w,
            pv_limit_sum_w: output.pv_limit_sum_w,
            evcs_count: output.evcs_count,
            evcs_budget_w: output.evcs_clusters_allowed_power_w,
            evcs_active_w: evcs_w,
            health: output.health,
        }
    }

    /// Executes all steps and returns the complete step record vector.
    pub fn run(&mut self) -> Vec<StepResult> {
        let mut clock = Clock::new(&self.config);
        let mut results = Vec::with_capacity(clock.remaining());
        clock.run(|tick| results.push(self.step(tick)));
        results
    }

    /// Deactivates the controller, clearing its ramp and smoothing history.
    pub fn shutdown(&mut self) {
        self.controller.deactivate();
    }

    pub fn controller(&self) -> &Para14aController {
        &self.controller
    }

    pub fn inverters(&self) -> &[SimPvInverter] {
        &self.inverters
    }

    pub fn clusters(&self) -> &[SimEvcsCluster] {
        &self.clusters
    }

    /// Returns a reference to the simulation configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

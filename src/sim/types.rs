//! Core simulation types: timing configuration and per-step records.

use std::fmt;

use serde::Serialize;

use crate::control::{ConsumptionLevel, Health, ProductionLevel};

/// Centralized simulation timing.
///
/// All devices and the engine reference this struct for timing parameters.
///
/// # Examples
///
/// ```
/// use para14a::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(96, 2, 7);
/// assert_eq!(cfg.dt_hours, 0.25);
/// assert_eq!(cfg.total_steps(), 192);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SimConfig {
    /// Number of control cycles per day.
    pub steps_per_day: usize,
    /// Number of days to simulate.
    pub days: usize,
    /// Duration of one step in hours, derived as `24.0 / steps_per_day`.
    pub dt_hours: f32,
    /// Master random seed for reproducibility.
    pub seed: u64,
}

impl SimConfig {
    /// Creates a new simulation configuration.
    ///
    /// # Panics
    ///
    /// Panics if `steps_per_day` or `days` is zero.
    pub fn new(steps_per_day: usize, days: usize, seed: u64) -> Self {
        assert!(steps_per_day > 0, "steps_per_day must be > 0");
        assert!(days > 0, "days must be > 0");
        Self {
            steps_per_day,
            days,
            dt_hours: 24.0 / steps_per_day as f32,
            seed,
        }
    }

    /// Total number of steps across all days.
    pub fn total_steps(&self) -> usize {
        self.steps_per_day * self.days
    }
}

/// Complete record of one simulation step.
///
/// Power readings describe the step's physical state, which was produced
/// under the limits written in the previous step. Levels, limits and budget
/// are what the controller decided and wrote during this step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub timestep: usize,
    pub time_hr: f32,
    pub production: ProductionLevel,
    pub consumption: ConsumptionLevel,
    /// Grid power (W; positive=import, negative=export).
    pub grid_w: i32,
    pub household_w: i32,
    /// PV power available from irradiance, ignoring limits (W).
    pub pv_available_w: i32,
    /// PV power actually produced (W).
    pub pv_active_w: i32,
    pub pv_hardware_w: i32,
    /// Aggregate PV limit written, `None` while unrestricted.
    pub pv_limit_sum_w: Option<i32>,
    pub evcs_count: u32,
    /// Cluster budget written (W, `-1` = unlimited).
    pub evcs_budget_w: i32,
    /// EVCS power actually drawn (W).
    pub evcs_active_w: i32,
    pub health: Health,
}

impl StepResult {
    /// PV energy lost to the limit in this step, in watts.
    pub fn curtailed_w(&self) -> i32 {
        (self.pv_available_w - self.pv_active_w).max(0)
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limit = match self.pv_limit_sum_w {
            Some(w) => format!("{w} W"),
            None => "none".to_string(),
        };
        let budget = if self.evcs_budget_w < 0 {
            "unlimited".to_string()
        } else {
            format!("{} W", self.evcs_budget_w)
        };
        write!(
            f,
            "t={:>4} ({:>5.2}h) | prod={:<11} cons={:<8} | grid={:>7} W | \
             pv={:>6}/{:<6} W limit={:<8} | evcs n={} {:>6} W budget={} | {}",
            self.timestep,
            self.time_hr,
            self.production.name(),
            self.consumption.name(),
            self.grid_w,
            self.pv_active_w,
            self.pv_available_w,
            limit,
            self.evcs_count,
            self.evcs_active_w,
            budget,
            self.health.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StepResult {
        StepResult {
            timestep: 3,
            time_hr: 0.75,
            production: ProductionLevel::Reduced60,
            consumption: ConsumptionLevel::Full,
            grid_w: -2_000,
            household_w: 600,
            pv_available_w: 9_000,
            pv_active_w: 6_600,
            pv_hardware_w: 10_000,
            pv_limit_sum_w: Some(6_600),
            evcs_count: 2,
            evcs_budget_w: -1,
            evcs_active_w: 4_000,
            health: Health::Ok,
        }
    }

    #[test]
    fn sim_config_multi_day() {
        let cfg = SimConfig::new(48, 3, 0);
        assert_eq!(cfg.total_steps(), 144);
        assert_eq!(cfg.dt_hours, 0.5);
    }

    #[test]
    #[should_panic]
    fn sim_config_zero_steps_panics() {
        SimConfig::new(0, 1, 0);
    }

    #[test]
    fn curtailment_never_negative() {
        let mut r = sample();
        assert_eq!(r.curtailed_w(), 2_400);
        r.pv_active_w = 9_500;
        assert_eq!(r.curtailed_w(), 0);
    }

    #[test]
    fn display_mentions_levels_and_budget() {
        let s = sample().to_string();
        assert!(s.contains("Reduced 60%"));
        assert!(s.contains("unlimited"));
        assert!(s.contains("6600 W"));
    }
}

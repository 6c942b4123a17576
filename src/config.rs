//! TOML-based scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::control::ControllerSettings;
use crate::control::controller::RELAY_INPUTS;
use crate::control::mean::DEFAULT_WEIGHTS;
use crate::error::ConfigError;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Restriction-mode controller settings.
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Uncontrolled household load.
    #[serde(default)]
    pub household: HouseholdConfig,
    /// PV inverters, in control order.
    #[serde(default = "default_pv_inverters")]
    pub pv_inverters: Vec<PvInverterConfig>,
    /// EVCS clusters, in distribution order.
    #[serde(default = "default_evcs_clusters")]
    pub evcs_clusters: Vec<EvcsClusterConfig>,
    /// Windows during which the grid operator closes relay channels.
    #[serde(default)]
    pub relay_schedule: Vec<RelayWindowConfig>,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of control cycles per simulated day (must be > 0).
    pub steps_per_day: usize,
    /// Number of days to simulate (must be > 0).
    pub days: usize,
    /// Master random seed.
    pub seed: u64,
    /// Step windows `[start, end)` during which the grid meter has no value.
    pub meter_dropouts: Vec<(usize, usize)>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps_per_day: 288,
            days: 1,
            seed: 42,
            meter_dropouts: Vec::new(),
        }
    }
}

/// Restriction-mode controller settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Relay wiring scheme name (snake_case or FNN identifier).
    pub relay_mode: String,
    /// Channel addresses of the relay inputs E1..E4.
    pub relay_inputs: Vec<String>,
    /// Raise controller diagnostics to debug level.
    pub debug_mode: bool,
    /// Smoothing weights for the PV limit target, oldest first.
    pub production_smoothing_weights: Vec<f64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            relay_mode: "fnn_2bit_one_consumer_one_producer".to_string(),
            relay_inputs: (0..RELAY_INPUTS)
                .map(|i| format!("io0/InputOutput{i}"))
                .collect(),
            debug_mode: false,
            production_smoothing_weights: DEFAULT_WEIGHTS.to_vec(),
        }
    }
}

impl ControllerConfig {
    pub fn settings(&self) -> ControllerSettings {
        ControllerSettings {
            relay_mode: self.relay_mode.clone(),
            relay_inputs: self.relay_inputs.clone(),
            production_smoothing_weights: self.production_smoothing_weights.clone(),
        }
    }
}

/// Household load parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HouseholdConfig {
    /// Average consumption (W).
    pub base_w: f32,
    /// Sinusoidal amplitude (W).
    pub amp_w: f32,
    /// Phase offset (radians).
    pub phase_rad: f32,
    /// Gaussian noise standard deviation (W).
    pub noise_std_w: f32,
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            base_w: 700.0,
            amp_w: 400.0,
            phase_rad: 1.2,
            noise_std_w: 60.0,
        }
    }
}

/// One PV inverter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PvInverterConfig {
    pub id: String,
    /// Static hardware maximum (W).
    pub hardware_max_w: i32,
    /// Available power at solar noon (W).
    pub peak_w: f32,
    /// Sunrise step index (inclusive).
    pub sunrise_idx: usize,
    /// Sunset step index (exclusive).
    pub sunset_idx: usize,
    /// Noise standard deviation as a fraction of output.
    pub noise_std: f32,
    /// Refuse every limit write.
    pub reject_writes: bool,
}

impl Default for PvInverterConfig {
    fn default() -> Self {
        Self {
            id: "pvInverter0".to_string(),
            hardware_max_w: 10_000,
            peak_w: 9_000.0,
            sunrise_idx: 72,
            sunset_idx: 216,
            noise_std: 0.05,
            reject_writes: false,
        }
    }
}

/// One EVCS cluster.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvcsClusterConfig {
    pub id: String,
    /// Number of charging stations.
    pub stations: usize,
    /// Maximum charging power per station (W).
    pub max_charge_w: f32,
    /// Minimum daily energy demand per station (Wh).
    pub demand_wh_min: f32,
    /// Maximum daily energy demand per station (Wh).
    pub demand_wh_max: f32,
    /// Minimum connected duration (steps).
    pub dwell_steps_min: usize,
    /// Maximum connected duration (steps).
    pub dwell_steps_max: usize,
}

impl Default for EvcsClusterConfig {
    fn default() -> Self {
        Self {
            id: "evcsCluster0".to_string(),
            stations: 2,
            max_charge_w: 11_000.0,
            demand_wh_min: 8_000.0,
            demand_wh_max: 25_000.0,
            dwell_steps_min: 24,
            dwell_steps_max: 120,
        }
    }
}

/// A window during which relay channels are closed or undefined.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayWindowConfig {
    /// Start step (inclusive).
    pub start_step: usize,
    /// End step (exclusive).
    pub end_step: usize,
    /// Channels closed during the window.
    pub closed: Vec<String>,
    /// Channels reading undefined during the window.
    pub undefined: Vec<String>,
}

impl Default for RelayWindowConfig {
    fn default() -> Self {
        Self {
            start_step: 0,
            end_step: 1,
            closed: Vec::new(),
            undefined: Vec::new(),
        }
    }
}

fn default_pv_inverters() -> Vec<PvInverterConfig> {
    vec![PvInverterConfig::default()]
}

fn default_evcs_clusters() -> Vec<EvcsClusterConfig> {
    vec![EvcsClusterConfig::default()]
}

fn window(start_step: usize, end_step: usize, closed: &[&str]) -> RelayWindowConfig {
    RelayWindowConfig {
        start_step,
        end_step,
        closed: closed.iter().map(|c| c.to_string()).collect(),
        undefined: Vec::new(),
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: no restriction windows.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            controller: ControllerConfig::default(),
            household: HouseholdConfig::default(),
            pv_inverters: default_pv_inverters(),
            evcs_clusters: default_evcs_clusters(),
            relay_schedule: Vec::new(),
        }
    }

    /// Returns the production-cap preset: two inverters curtailed to 60%
    /// around noon and to 30% in the early afternoon.
    pub fn production_cap() -> Self {
        Self {
            pv_inverters: vec![
                PvInverterConfig {
                    id: "pvInverter0".to_string(),
                    hardware_max_w: 12_000,
                    peak_w: 11_500.0,
                    ..PvInverterConfig::default()
                },
                PvInverterConfig {
                    id: "pvInverter1".to_string(),
                    hardware_max_w: 8_000,
                    peak_w: 7_600.0,
                    ..PvInverterConfig::default()
                },
            ],
            relay_schedule: vec![
                // E4 closed: 60%
                window(120, 156, &["io0/InputOutput3"]),
                // E3 closed: 30%
                window(156, 180, &["io0/InputOutput2"]),
            ],
            ..Self::baseline()
        }
    }

    /// Returns the consumption-dimming preset: two clusters dimmed to the
    /// guaranteed minimum power during the evening peak.
    pub fn consumption_dimming() -> Self {
        Self {
            evcs_clusters: vec![
                EvcsClusterConfig {
                    id: "evcsCluster0".to_string(),
                    stations: 2,
                    dwell_steps_min: 36,
                    ..EvcsClusterConfig::default()
                },
                EvcsClusterConfig {
                    id: "evcsCluster1".to_string(),
                    stations: 3,
                    demand_wh_min: 15_000.0,
                    demand_wh_max: 40_000.0,
                    ..EvcsClusterConfig::default()
                },
            ],
            relay_schedule: vec![
                // E2 closed: reduced consumption
                window(204, 252, &["io0/InputOutput1"]),
            ],
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "production_cap", "consumption_dimming"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "production_cap" => Ok(Self::production_cap()),
            "consumption_dimming" => Ok(Self::consumption_dimming()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. An unknown relay
    /// mode is not an error: the controller falls back to no wiring.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.steps_per_day == 0 {
            errors.push(ConfigError::new("simulation.steps_per_day", "must be > 0"));
        }
        if s.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }
        for (i, &(start, end)) in s.meter_dropouts.iter().enumerate() {
            if start >= end {
                errors.push(ConfigError::new(
                    format!("simulation.meter_dropouts[{i}]"),
                    "start must be < end",
                ));
            }
        }

        let c = &self.controller;
        if c.relay_inputs.len() > RELAY_INPUTS {
            errors.push(ConfigError::new(
                "controller.relay_inputs",
                format!("at most {RELAY_INPUTS} inputs, got {}", c.relay_inputs.len()),
            ));
        }
        if c
            .production_smoothing_weights
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            errors.push(ConfigError::new(
                "controller.production_smoothing_weights",
                "weights must be finite and >= 0",
            ));
        }

        if self.household.base_w < 0.0 {
            errors.push(ConfigError::new("household.base_w", "must be >= 0"));
        }

        let mut ids = HashSet::new();
        for (i, pv) in self.pv_inverters.iter().enumerate() {
            let field = |name: &str| format!("pv_inverters[{i}].{name}");
            if pv.id.is_empty() || !ids.insert(pv.id.as_str()) {
                errors.push(ConfigError::new(field("id"), "must be non-empty and unique"));
            }
            if pv.hardware_max_w < 0 {
                errors.push(ConfigError::new(field("hardware_max_w"), "must be >= 0"));
            }
            if pv.sunrise_idx >= pv.sunset_idx {
                errors.push(ConfigError::new(field("sunrise_idx"), "must be < sunset_idx"));
            }
            if s.steps_per_day > 0 && pv.sunset_idx > s.steps_per_day {
                errors.push(ConfigError::new(
                    field("sunset_idx"),
                    "must be <= simulation.steps_per_day",
                ));
            }
        }

        for (i, ev) in self.evcs_clusters.iter().enumerate() {
            let field = |name: &str| format!("evcs_clusters[{i}].{name}");
            if ev.id.is_empty() || !ids.insert(ev.id.as_str()) {
                errors.push(ConfigError::new(field("id"), "must be non-empty and unique"));
            }
            if ev.max_charge_w <= 0.0 {
                errors.push(ConfigError::new(field("max_charge_w"), "must be > 0"));
            }
            if ev.demand_wh_min < 0.0 || ev.demand_wh_min > ev.demand_wh_max {
                errors.push(ConfigError::new(
                    field("demand_wh_min"),
                    "must be in [0, demand_wh_max]",
                ));
            }
            if ev.dwell_steps_min == 0 || ev.dwell_steps_min > ev.dwell_steps_max {
                errors.push(ConfigError::new(
                    field("dwell_steps_min"),
                    "must be in [1, dwell_steps_max]",
                ));
            }
        }

        for (i, w) in self.relay_schedule.iter().enumerate() {
            if w.start_step >= w.end_step {
                errors.push(ConfigError::new(
                    format!("relay_schedule[{i}].start_step"),
                    "must be < end_step",
                ));
            }
            for channel in w.closed.iter().chain(&w.undefined) {
                if !c.relay_inputs.contains(channel) {
                    errors.push(ConfigError::new(
                        format!("relay_schedule[{i}]"),
                        format!("channel \"{channel}\" is not a configured relay input"),
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let errors = ScenarioConfig::baseline().validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
steps_per_day = 96
days = 2
seed = 7
meter_dropouts = [[10, 12]]

[controller]
relay_mode = "FNN2bit1StbV1StbE"
relay_inputs = ["io1/Relay1", "io1/Relay2", "io1/Relay3", "io1/Relay4"]
debug_mode = true
production_smoothing_weights = []

[household]
base_w = 500.0

[[pv_inverters]]
id = "pv0"
hardware_max_w = 8000
peak_w = 7500.0
sunrise_idx = 24
sunset_idx = 72

[[pv_inverters]]
id = "pv1"
hardware_max_w = 4000
sunrise_idx = 24
sunset_idx = 72

[[evcs_clusters]]
id = "evcs0"
stations = 3

[[relay_schedule]]
start_step = 40
end_step = 50
closed = ["io1/Relay4"]
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.unwrap();
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
        assert_eq!(cfg.simulation.meter_dropouts, vec![(10, 12)]);
        assert_eq!(cfg.pv_inverters.len(), 2);
        assert_eq!(cfg.pv_inverters[1].peak_w, 9_000.0);
        assert!(cfg.controller.debug_mode);
        assert!(cfg.controller.production_smoothing_weights.is_empty());
        assert_eq!(cfg.evcs_clusters[0].stations, 3);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[controller]
relay_mode = "none"
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = ScenarioConfig::from_toml_str("[simulation]\nseed = 99\n").unwrap();
        assert_eq!(cfg.simulation.seed, 99);
        assert_eq!(cfg.simulation.steps_per_day, 288);
        assert_eq!(cfg.pv_inverters.len(), 1);
        assert_eq!(cfg.controller.relay_inputs.len(), 4);
    }

    #[test]
    fn unknown_relay_mode_is_not_a_validation_error() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.controller.relay_mode = "FNN3bit".to_string();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_catches_zero_steps() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.steps_per_day = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.steps_per_day"));
    }

    #[test]
    fn validation_catches_duplicate_ids() {
        let mut cfg = ScenarioConfig::production_cap();
        cfg.pv_inverters[1].id = cfg.pv_inverters[0].id.clone();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "pv_inverters[1].id"));
    }

    #[test]
    fn validation_catches_unknown_schedule_channel() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.relay_schedule.push(window(1, 2, &["io9/Relay1"]));
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "relay_schedule[0]"));
    }

    #[test]
    fn validation_catches_too_many_inputs_and_bad_weights() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.controller.relay_inputs.push("io0/InputOutput4".into());
        cfg.controller.production_smoothing_weights = vec![1.0, -2.0];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "controller.relay_inputs"));
        assert!(
            errors
                .iter()
                .any(|e| e.field == "controller.production_smoothing_weights")
        );
    }

    #[test]
    fn production_cap_has_two_inverters_and_windows() {
        let cfg = ScenarioConfig::production_cap();
        assert_eq!(cfg.pv_inverters.len(), 2);
        assert_eq!(cfg.relay_schedule.len(), 2);
    }
}

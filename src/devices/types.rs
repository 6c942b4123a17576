//! Collaborator traits at the controller boundary and shared helpers for the
//! simulated devices.

use rand::{Rng, rngs::StdRng};

use crate::error::WriteError;

/// Reads boolean relay inputs by channel address (e.g. `io0/InputOutput0`).
pub trait RelaySource {
    /// `None` if the address is unknown or the channel has no value yet.
    fn read_relay(&self, address: &str) -> Option<bool>;
}

/// Grid connection point meter.
pub trait GridMeter {
    fn id(&self) -> &str;

    /// Signed active power in watts: positive imports, negative exports.
    fn active_power_w(&self) -> Option<i32>;
}

/// A PV inverter accepting an active power limit.
pub trait PvInverter {
    fn id(&self) -> &str;

    /// Static configured hardware maximum in watts.
    fn hardware_max_w(&self) -> i32;

    fn active_power_w(&self) -> Option<i32>;

    /// Writes the active power limit. The value does not persist on the far
    /// side and has to be written again every cycle.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if the inverter refuses the value.
    fn set_active_power_limit_w(&mut self, limit_w: i32) -> Result<(), WriteError>;
}

/// A cluster of EV charging stations sharing one power budget.
pub trait EvcsCluster {
    fn id(&self) -> &str;

    fn active_power_w(&self) -> Option<i32>;

    /// Number of charging stations currently in the cluster.
    fn evcs_count(&self) -> Option<u32>;

    /// Writes the power the cluster may distribute, `-1` for unlimited.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if the cluster refuses the value.
    fn set_maximum_allowed_power_w(&mut self, power_w: i32) -> Result<(), WriteError>;
}

/// Contextual information passed to simulated devices each step.
#[derive(Debug, Clone, Copy)]
pub struct DeviceContext {
    pub timestep: usize,
}

impl DeviceContext {
    pub fn new(timestep: usize) -> Self {
        Self { timestep }
    }
}

/// A simulated device taking part in the site power balance.
pub trait Device {
    /// Advances the device to `context.timestep` and returns its power.
    ///
    /// Positive values indicate consumption, negative values generation.
    fn power_w(&mut self, context: &DeviceContext) -> i32;
}

/// Gaussian noise via the Box-Muller transform.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}

/// Half-cosine daylight fraction in `[0, 1]` for step `t` of the day.
///
/// Zero outside `[sunrise_idx, sunset_idx)`, peaking at solar noon.
pub fn daylight_frac(
    t: usize,
    steps_per_day: usize,
    sunrise_idx: usize,
    sunset_idx: usize,
) -> f32 {
    let day_t = t % steps_per_day.max(1);
    if day_t < sunrise_idx || day_t >= sunset_idx {
        return 0.0;
    }

    let span = (sunset_idx - sunrise_idx) as f32;
    let x = (day_t - sunrise_idx) as f32 + 0.5;
    (std::f32::consts::PI * x / span).sin().max(0.0)
}

use crate::devices::types::{Device, DeviceContext, PvInverter, daylight_frac, gaussian_noise};
use crate::error::WriteError;
use crate::sim::types::SimConfig;
use rand::{SeedableRng, rngs::StdRng};

/// A simulated PV inverter with a half-cosine daylight profile.
///
/// Production is the available irradiance power capped by the last active
/// power limit written to it. Active power stays undefined until the first
/// simulation step.
///
/// # Power Flow Convention
/// [`Device::power_w`] returns **negative** values during daylight
/// (generation), while [`PvInverter::active_power_w`] reports the produced
/// power as a positive number.
#[derive(Debug, Clone)]
pub struct SimPvInverter {
    id: String,
    /// Static hardware maximum in watts.
    pub hardware_max_w: i32,
    /// Available power at solar noon under clear sky, in watts.
    pub peak_w: f32,
    /// Time step index when sunrise occurs (inclusive).
    pub sunrise_idx: usize,
    /// Time step index when sunset occurs (exclusive).
    pub sunset_idx: usize,
    /// Standard deviation of the noise as a fraction of output.
    pub noise_std: f32,
    /// Refuse every limit write, emulating a read-only device.
    pub reject_writes: bool,
    steps_per_day: usize,
    limit_w: Option<i32>,
    available_w: i32,
    active_power_w: Option<i32>,
    rng: StdRng,
}

impl SimPvInverter {
    /// Creates a simulated inverter.
    ///
    /// # Arguments
    ///
    /// * `id` - Component identifier
    /// * `hardware_max_w` - Static hardware maximum in watts
    /// * `peak_w` - Available power at solar noon in watts
    /// * `sunrise_idx` - Time step index when sunrise occurs (inclusive)
    /// * `sunset_idx` - Time step index when sunset occurs (exclusive)
    /// * `noise_std` - Standard deviation of noise (e.g. 0.05 for +/-5%)
    /// * `config` - Simulation configuration for timing
    /// * `seed` - Random seed for reproducible noise generation
    ///
    /// # Panics
    ///
    /// Panics if `sunrise_idx >= sunset_idx` or `sunset_idx > steps_per_day`.
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        hardware_max_w: i32,
        peak_w: f32,
        sunrise_idx: usize,
        sunset_idx: usize,
        noise_std: f32,
        config: &SimConfig,
        seed: u64,
    ) -> Self {
        assert!(sunrise_idx < sunset_idx && sunset_idx <= config.steps_per_day);
        Self {
            id: id.into(),
            hardware_max_w: hardware_max_w.max(0),
            peak_w: peak_w.max(0.0),
            sunrise_idx,
            sunset_idx,
            noise_std: noise_std.max(0.0),
            reject_writes: false,
            steps_per_day: config.steps_per_day,
            limit_w: None,
            available_w: 0,
            active_power_w: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Power the panels could deliver in the last step, ignoring the limit.
    pub fn available_w(&self) -> i32 {
        self.available_w
    }

    /// Last limit accepted by the inverter.
    pub fn limit_w(&self) -> Option<i32> {
        self.limit_w
    }
}

impl Device for SimPvInverter {
    fn power_w(&mut self, context: &DeviceContext) -> i32 {
        let frac = daylight_frac(
            context.timestep,
            self.steps_per_day,
            self.sunrise_idx,
            self.sunset_idx,
        );
        self.available_w = if frac <= 0.0 {
            0
        } else {
            let noise_mult = 1.0 + gaussian_noise(&mut self.rng, self.noise_std);
            let w = (self.peak_w * frac * noise_mult).round().max(0.0) as i32;
            w.min(self.hardware_max_w)
        };

        let produced = self
            .available_w
            .min(self.limit_w.unwrap_or(self.hardware_max_w))
            .max(0);
        self.active_power_w = Some(produced);
        -produced
    }
}

impl PvInverter for SimPvInverter {
    fn id(&self) -> &str {
        &self.id
    }

    fn hardware_max_w(&self) -> i32 {
        self.hardware_max_w
    }

    fn active_power_w(&self) -> Option<i32> {
        self.active_power_w
    }

    fn set_active_power_limit_w(&mut self, limit_w: i32) -> Result<(), WriteError> {
        if self.reject_writes {
            return Err(WriteError::Rejected {
                component: self.id.clone(),
                value: limit_w,
                reason: "write access denied".into(),
            });
        }
        if limit_w < 0 {
            return Err(WriteError::Rejected {
                component: self.id.clone(),
                value: limit_w,
                reason: "negative limit".into(),
            });
        }
        self.limit_w = Some(limit_w.min(self.hardware_max_w));
        Ok(())
    }
}

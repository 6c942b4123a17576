use crate::devices::types::{Device, DeviceContext, gaussian_noise};
use crate::sim::types::SimConfig;
use rand::{SeedableRng, rngs::StdRng};

/// Uncontrolled household load with a sinusoidal daily pattern.
///
/// # Power Flow Convention
/// Returns **positive** values (consumption).
#[derive(Debug, Clone)]
pub struct Household {
    /// Average consumption in watts.
    pub base_w: f32,
    /// Amplitude of the daily variation in watts.
    pub amp_w: f32,
    /// Phase offset in radians (0 = mean load at midnight, rising).
    pub phase_rad: f32,
    /// Standard deviation of the Gaussian noise in watts.
    pub noise_std_w: f32,
    steps_per_day: usize,
    rng: StdRng,
}

impl Household {
    /// Creates a household load profile.
    ///
    /// # Arguments
    ///
    /// * `base_w` - Average consumption in watts
    /// * `amp_w` - Amplitude of the daily sinusoid in watts
    /// * `phase_rad` - Phase offset in radians
    /// * `noise_std_w` - Standard deviation of the noise in watts
    /// * `config` - Simulation configuration for timing
    /// * `seed` - Random seed for reproducible noise
    pub fn new(
        base_w: f32,
        amp_w: f32,
        phase_rad: f32,
        noise_std_w: f32,
        config: &SimConfig,
        seed: u64,
    ) -> Self {
        Self {
            base_w: base_w.max(0.0),
            amp_w,
            phase_rad,
            noise_std_w: noise_std_w.max(0.0),
            steps_per_day: config.steps_per_day.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Demand in watts at `timestep`, never negative.
    pub fn demand_w(&mut self, timestep: usize) -> f32 {
        let day_pos = (timestep % self.steps_per_day) as f32 / self.steps_per_day as f32;
        let angle = 2.0 * std::f32::consts::PI * day_pos + self.phase_rad;
        let noise = gaussian_noise(&mut self.rng, self.noise_std_w);

        (self.base_w + self.amp_w * angle.sin() + noise).max(0.0)
    }
}

impl Device for Household {
    fn power_w(&mut self, context: &DeviceContext) -> i32 {
        self.demand_w(context.timestep).round() as i32
    }
}

use crate::devices::types::{Device, DeviceContext, EvcsCluster};
use crate::error::WriteError;
use crate::sim::types::SimConfig;
use rand::{Rng, SeedableRng, rngs::StdRng};

#[derive(Debug, Clone)]
struct EvSession {
    arrival_step: usize,
    deadline_step: usize,
    remaining_wh: f32,
}

/// One charging point with a single sampled session per day.
#[derive(Debug, Clone)]
struct ChargePoint {
    sampled_day: Option<usize>,
    session: Option<EvSession>,
}

/// Session parameters shared by all charge points of a cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionProfile {
    /// Maximum charging power per station in watts.
    pub max_charge_w: f32,
    /// Minimum daily energy demand per station in Wh.
    pub demand_wh_min: f32,
    /// Maximum daily energy demand per station in Wh.
    pub demand_wh_max: f32,
    /// Minimum connected duration in steps.
    pub dwell_steps_min: usize,
    /// Maximum connected duration in steps.
    pub dwell_steps_max: usize,
}

/// A simulated cluster of EV charging stations sharing one allowance.
///
/// Each station samples one charging session per day (arrival, dwell and
/// energy). While connected it requests the power needed to finish by the
/// deadline, capped at the station maximum. The cluster serves the requests
/// in station order out of the last allowance written to it; `-1` or no
/// allowance at all means unrestricted.
///
/// # Power Flow Convention
/// Returns **positive** values (consumption).
#[derive(Debug, Clone)]
pub struct SimEvcsCluster {
    id: String,
    pub profile: SessionProfile,
    steps_per_day: usize,
    dt_hours: f32,
    stations: Vec<ChargePoint>,
    allowed_power_w: Option<i32>,
    active_power_w: Option<i32>,
    rng: StdRng,
}

impl SimEvcsCluster {
    /// Creates a cluster of `station_count` charging points.
    ///
    /// # Panics
    ///
    /// Panics if `max_charge_w <= 0`, the demand range is invalid, or the
    /// dwell range is invalid.
    pub fn new(
        id: impl Into<String>,
        station_count: usize,
        profile: SessionProfile,
        config: &SimConfig,
        seed: u64,
    ) -> Self {
        assert!(profile.max_charge_w > 0.0);
        assert!(profile.demand_wh_min >= 0.0);
        assert!(profile.demand_wh_max >= profile.demand_wh_min);
        assert!(profile.dwell_steps_min > 0);
        assert!(profile.dwell_steps_max >= profile.dwell_steps_min);

        Self {
            id: id.into(),
            profile,
            steps_per_day: config.steps_per_day,
            dt_hours: config.dt_hours,
            stations: vec![
                ChargePoint {
                    sampled_day: None,
                    session: None,
                };
                station_count
            ],
            allowed_power_w: None,
            active_power_w: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Last allowance accepted by the cluster.
    pub fn allowed_power_w(&self) -> Option<i32> {
        self.allowed_power_w
    }

    fn sample_session(&mut self) -> EvSession {
        let p = self.profile;
        let dwell_max = p.dwell_steps_max.min(self.steps_per_day);
        let dwell_min = p.dwell_steps_min.min(dwell_max);
        let dwell = self.rng.random_range(dwell_min..=dwell_max);

        let arrival = self.rng.random_range(0..=self.steps_per_day - dwell);
        let max_deliverable_wh = p.max_charge_w * self.dt_hours * dwell as f32;
        let demand_wh = self
            .rng
            .random_range(p.demand_wh_min..=p.demand_wh_max)
            .min(max_deliverable_wh)
            .max(0.0);

        EvSession {
            arrival_step: arrival,
            deadline_step: arrival + dwell,
            remaining_wh: demand_wh,
        }
    }

    /// Unconstrained request of station `idx` in watts.
    fn requested_w(&mut self, idx: usize, timestep: usize) -> f32 {
        let day = timestep / self.steps_per_day;
        let day_t = timestep % self.steps_per_day;

        if self.stations[idx].sampled_day != Some(day) {
            let session = self.sample_session();
            let station = &mut self.stations[idx];
            station.sampled_day = Some(day);
            station.session = Some(session);
        }

        let Some(session) = &self.stations[idx].session else {
            return 0.0;
        };
        if day_t < session.arrival_step || day_t >= session.deadline_step {
            return 0.0;
        }
        if session.remaining_wh <= 0.0 {
            return 0.0;
        }

        let remaining_steps = (session.deadline_step - day_t) as f32;
        (session.remaining_wh / (remaining_steps * self.dt_hours))
            .min(self.profile.max_charge_w)
            .max(0.0)
    }
}

impl Device for SimEvcsCluster {
    fn power_w(&mut self, context: &DeviceContext) -> i32 {
        let mut budget_w = match self.allowed_power_w {
            Some(allowed) if allowed >= 0 => allowed as f32,
            _ => f32::INFINITY,
        };

        let mut total_w = 0.0_f32;
        for idx in 0..self.stations.len() {
            let charge_w = self.requested_w(idx, context.timestep).min(budget_w).max(0.0);
            budget_w -= charge_w;
            total_w += charge_w;

            if let Some(session) = self.stations[idx].session.as_mut() {
                session.remaining_wh = (session.remaining_wh - charge_w * self.dt_hours).max(0.0);
            }
        }

        let total = total_w.round() as i32;
        self.active_power_w = Some(total);
        total
    }
}

impl EvcsCluster for SimEvcsCluster {
    fn id(&self) -> &str {
        &self.id
    }

    fn active_power_w(&self) -> Option<i32> {
        self.active_power_w
    }

    fn evcs_count(&self) -> Option<u32> {
        u32::try_from(self.stations.len()).ok()
    }

    fn set_maximum_allowed_power_w(&mut self, power_w: i32) -> Result<(), WriteError> {
        if power_w < -1 {
            return Err(WriteError::Rejected {
                component: self.id.clone(),
                value: power_w,
                reason: "allowance below the unlimited sentinel".into(),
            });
        }
        self.allowed_power_w = Some(power_w);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SimConfig {
        SimConfig::new(24, 1, 0)
    }

    fn ctx(t: usize) -> DeviceContext {
        DeviceContext::new(t)
    }

    fn profile(demand_wh: f32, dwell: usize) -> SessionProfile {
        SessionProfile {
            max_charge_w: 11_000.0,
            demand_wh_min: demand_wh,
            demand_wh_max: demand_wh,
            dwell_steps_min: dwell,
            dwell_steps_max: dwell,
        }
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let c = cfg();
        let p = SessionProfile {
            max_charge_w: 7_400.0,
            demand_wh_min: 6_000.0,
            demand_wh_max: 12_000.0,
            dwell_steps_min: 4,
            dwell_steps_max: 10,
        };
        let mut a = SimEvcsCluster::new("evcs0", 3, p, &c, 42);
        let mut b = SimEvcsCluster::new("evcs0", 3, p, &c, 42);
        for t in 0..48 {
            assert_eq!(a.power_w(&ctx(t)), b.power_w(&ctx(t)));
        }
    }

    #[test]
    fn test_zero_demand_never_charges() {
        let mut cluster = SimEvcsCluster::new("evcs0", 2, profile(0.0, 4), &cfg(), 7);
        for t in 0..24 {
            assert_eq!(cluster.power_w(&ctx(t)), 0);
        }
    }

    #[test]
    fn test_unrestricted_session_finishes() {
        let c = cfg();
        let mut cluster = SimEvcsCluster::new("evcs0", 1, profile(10_000.0, 6), &c, 99);
        cluster.set_maximum_allowed_power_w(-1).unwrap();
        let total_wh: f32 = (0..24).map(|t| cluster.power_w(&ctx(t)) as f32 * c.dt_hours).sum();
        assert!((total_wh - 10_000.0).abs() < 5.0, "delivered {total_wh} Wh");
    }

    #[test]
    fn test_allowance_caps_draw() {
        let mut cluster = SimEvcsCluster::new("evcs0", 3, profile(60_000.0, 24), &cfg(), 3);
        cluster.set_maximum_allowed_power_w(5_000).unwrap();
        for t in 0..24 {
            assert!(cluster.power_w(&ctx(t)) <= 5_000);
        }
        cluster.set_maximum_allowed_power_w(0).unwrap();
        assert_eq!(cluster.power_w(&ctx(30)), 0);
    }

    #[test]
    fn test_count_and_undefined_power() {
        let cluster = SimEvcsCluster::new("evcs0", 4, profile(0.0, 1), &cfg(), 1);
        assert_eq!(cluster.evcs_count(), Some(4));
        assert_eq!(cluster.active_power_w(), None);
    }
}

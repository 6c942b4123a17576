//! The per-cycle orchestrator: decode relays, capture a snapshot, compute
//! PV limits and the EVCS budget, write both to the collaborators.

use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use super::consumption::{self, UNLIMITED};
use super::distribution::{ClusterDemand, distribute};
use super::level::{ConsumptionLevel, ProductionLevel};
use super::mean::DEFAULT_WEIGHTS;
use super::relay::{self, RelayReadings, RelayWiringScheme};
use super::state::ControllerState;
use super::types::{CycleOutput, EvcsClusterEntry, Health, PvInverterEntry, Snapshot};
use crate::devices::types::{EvcsCluster, GridMeter, PvInverter, RelaySource};

/// Number of relay inputs a wiring scheme can use.
pub const RELAY_INPUTS: usize = 4;

/// Static settings read once at activation.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Wiring scheme name, see [`RelayWiringScheme`].
    pub relay_mode: String,
    /// Channel addresses of E1..E4; missing entries read as undefined.
    pub relay_inputs: Vec<String>,
    pub production_smoothing_weights: Vec<f64>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            relay_mode: RelayWiringScheme::None.as_str().to_string(),
            relay_inputs: Vec::new(),
            production_smoothing_weights: DEFAULT_WEIGHTS.to_vec(),
        }
    }
}

/// Restriction-mode controller for PV inverters and EVCS clusters.
///
/// Driven by an external scheduler: [`decode_relays`](Self::decode_relays)
/// first, then [`run_cycle`](Self::run_cycle), once per control period.
#[derive(Debug, Clone)]
pub struct Para14aController {
    scheme: RelayWiringScheme,
    scheme_recognized: bool,
    relay_inputs: [Option<String>; RELAY_INPUTS],
    production: ProductionLevel,
    consumption: ConsumptionLevel,
    decode_health: Health,
    state: ControllerState,
    applied_limits: HashMap<String, i32>,
    last_cycle: Option<CycleOutput>,
}

impl Para14aController {
    pub fn new(settings: ControllerSettings) -> Self {
        let (scheme, scheme_recognized) = RelayWiringScheme::resolve(&settings.relay_mode);
        if settings.relay_inputs.len() > RELAY_INPUTS {
            warn!(
                configured = settings.relay_inputs.len(),
                "more than {RELAY_INPUTS} relay inputs configured, ignoring the rest"
            );
        }
        let mut inputs = settings.relay_inputs.into_iter();
        let relay_inputs = std::array::from_fn(|_| inputs.next());
        info!(%scheme, fnn = scheme.fnn_name(), "controller activated");

        Self {
            scheme,
            scheme_recognized,
            relay_inputs,
            production: ProductionLevel::default(),
            consumption: ConsumptionLevel::default(),
            decode_health: Health::Ok,
            state: ControllerState::new(settings.production_smoothing_weights),
            applied_limits: HashMap::new(),
            last_cycle: None,
        }
    }

    pub fn scheme(&self) -> RelayWiringScheme {
        self.scheme
    }

    /// Levels decoded by the last [`decode_relays`](Self::decode_relays).
    pub fn levels(&self) -> (ProductionLevel, ConsumptionLevel) {
        (self.production, self.consumption)
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Status published by the last completed cycle.
    pub fn last_cycle(&self) -> Option<&CycleOutput> {
        self.last_cycle.as_ref()
    }

    /// Reads the relay inputs and decodes both management levels.
    pub fn decode_relays(
        &mut self,
        relays: &impl RelaySource,
    ) -> (ProductionLevel, ConsumptionLevel) {
        let mut health = Health::Ok;
        if !self.scheme_recognized {
            health.escalate(Health::Warning);
        }

        let mut readings: RelayReadings = [None; RELAY_INPUTS];
        for (reading, address) in readings.iter_mut().zip(&self.relay_inputs) {
            let Some(address) = address else { continue };
            *reading = relays.read_relay(address);
            if reading.is_none() {
                warn!(address = address.as_str(), "relay input undefined, treating as restrictive");
                health.escalate(Health::Warning);
            }
        }

        let (production, consumption) = relay::decode(self.scheme, readings);
        if production != self.production {
            info!(from = %self.production, to = %production, "production management changed");
        }
        if consumption != self.consumption {
            info!(from = %self.consumption, to = %consumption, "consumption management changed");
        }
        debug!(?readings, %production, %consumption, "relays decoded");

        self.production = production;
        self.consumption = consumption;
        self.decode_health = health;
        (production, consumption)
    }

    /// Reads every telemetry value once for this cycle.
    pub fn snapshot<M, P, E>(&self, meter: &M, inverters: &[P], clusters: &[E]) -> Snapshot
    where
        M: GridMeter,
        P: PvInverter,
        E: EvcsCluster,
    {
        Snapshot {
            production: self.production,
            consumption: self.consumption,
            grid_active_power_w: meter.active_power_w(),
            inverters: inverters
                .iter()
                .map(|inv| PvInverterEntry {
                    id: inv.id().to_string(),
                    hardware_max_w: inv.hardware_max_w().max(0),
                    active_power_w: inv.active_power_w(),
                    last_applied_limit_w: self.applied_limits.get(inv.id()).copied(),
                })
                .collect(),
            clusters: clusters
                .iter()
                .map(|cluster| EvcsClusterEntry {
                    id: cluster.id().to_string(),
                    active_power_w: cluster.active_power_w(),
                    evcs_count: cluster.evcs_count(),
                })
                .collect(),
        }
    }

    /// Computes limits and allowances for `snapshot` without writing them.
    ///
    /// Undefined telemetry counts as 0 and degrades health to
    /// [`Health::Warning`].
    pub fn compute(&mut self, snapshot: &Snapshot) -> CycleOutput {
        let mut health = self.decode_health;

        let grid_w = snapshot.grid_active_power_w.unwrap_or_else(|| {
            warn!("grid meter active power undefined, using 0");
            health.escalate(Health::Warning);
            0
        });

        let mut pv_sum: i64 = 0;
        for inv in &snapshot.inverters {
            pv_sum += i64::from(inv.active_power_w.unwrap_or_else(|| {
                warn!(inverter = inv.id.as_str(), "pv active power undefined, using 0");
                health.escalate(Health::Warning);
                0
            }));
        }
        let pv_sum_w = i32::try_from(pv_sum.max(0)).unwrap_or(i32::MAX);

        let mut evcs_count: u32 = 0;
        let mut demands = Vec::with_capacity(snapshot.clusters.len());
        for cluster in &snapshot.clusters {
            let count = cluster.evcs_count.unwrap_or_else(|| {
                warn!(cluster = cluster.id.as_str(), "evcs count undefined, using 0");
                health.escalate(Health::Warning);
                0
            });
            evcs_count = evcs_count.saturating_add(count);
            let active_power_w = cluster.active_power_w.unwrap_or_else(|| {
                warn!(cluster = cluster.id.as_str(), "cluster active power undefined, using 0");
                health.escalate(Health::Warning);
                0
            });
            demands.push(ClusterDemand::new(cluster.id.clone(), active_power_w));
        }

        let limits = self.state.production.calculate(
            snapshot.production,
            &snapshot.inverters,
            grid_w,
            pv_sum_w,
        );
        let budget = consumption::budget(snapshot.consumption, evcs_count, pv_sum_w);
        let cluster_allowances = distribute(budget, &demands);

        debug!(
            production = %snapshot.production,
            consumption = %snapshot.consumption,
            grid_w,
            pv_sum_w,
            pv_limit_sum_w = ?limits.applied_sum_w,
            evcs_count,
            budget,
            unlimited = budget == UNLIMITED,
            "cycle computed"
        );

        CycleOutput {
            production: snapshot.production,
            consumption: snapshot.consumption,
            pv_active_power_sum_w: pv_sum_w,
            pv_hardware_max_sum_w: limits.hardware_sum_w,
            pv_limit_sum_w: limits.applied_sum_w,
            pv_limits: limits.limits,
            evcs_count,
            evcs_clusters_allowed_power_w: budget,
            cluster_allowances,
            health,
        }
    }

    /// Runs one control cycle against the collaborators.
    ///
    /// Every limit and allowance is written, even if unchanged. A rejected
    /// write is logged and raises health to [`Health::Fault`]; the remaining
    /// writes still happen.
    pub fn run_cycle<M, P, E>(
        &mut self,
        meter: &M,
        inverters: &mut [P],
        clusters: &mut [E],
    ) -> CycleOutput
    where
        M: GridMeter,
        P: PvInverter,
        E: EvcsCluster,
    {
        let snapshot = self.snapshot(meter, inverters, clusters);
        let mut output = self.compute(&snapshot);

        for (inverter, limit) in inverters.iter_mut().zip(&output.pv_limits) {
            match inverter.set_active_power_limit_w(limit.limit_w) {
                Ok(()) => {
                    self.applied_limits.insert(limit.id.clone(), limit.limit_w);
                }
                Err(err) => {
                    error!(inverter = limit.id.as_str(), %err, "failed to set pv limit");
                    output.health.escalate(Health::Fault);
                }
            }
        }

        for (cluster, allowance) in clusters.iter_mut().zip(&output.cluster_allowances) {
            if let Err(err) = cluster.set_maximum_allowed_power_w(allowance.allowed_power_w) {
                error!(cluster = allowance.id.as_str(), %err, "failed to set cluster allowance");
                output.health.escalate(Health::Fault);
            }
        }

        self.last_cycle = Some(output.clone());
        output
    }

    /// Resets levels and all ramp and smoothing history.
    pub fn deactivate(&mut self) {
        self.production = ProductionLevel::default();
        self.consumption = ConsumptionLevel::default();
        self.decode_health = Health::Ok;
        self.state.reset();
        self.applied_limits.clear();
        self.last_cycle = None;
        info!("controller deactivated");
    }
}

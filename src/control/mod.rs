//! Restriction-mode control core.
//!
//! Decodes the grid operator's relay inputs into production and consumption
//! management levels, derives a ramp-limited PV limit and an EVCS power
//! budget, and distributes the budget over charging clusters.

/// Cycle orchestrator.
pub mod controller;
/// EVCS budget and regulatory minimum power.
pub mod consumption;
/// Budget distribution across clusters.
pub mod distribution;
/// Management levels.
pub mod level;
/// Weighted moving average.
pub mod mean;
/// PV limit calculation.
pub mod production;
/// Ramp limiting.
pub mod ramp;
/// Wiring schemes and the relay decoder.
pub mod relay;
pub mod state;
pub mod types;

pub use consumption::UNLIMITED;
pub use controller::{ControllerSettings, Para14aController};
pub use distribution::{ClusterAllowance, ClusterDemand, distribute};
pub use level::{ConsumptionLevel, ProductionLevel};
pub use mean::WeightedMovingAverage;
pub use production::ProductionLimitCalculator;
pub use ramp::{RampController, RampStep};
pub use relay::{RelayWiringScheme, decode};
pub use state::ControllerState;
pub use types::{CycleOutput, Health, InverterLimit, Snapshot};

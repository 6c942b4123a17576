//! Collaborators at the controller boundary and their simulated counterparts.

/// Simulated EV charging station cluster.
pub mod evcs_cluster;
pub mod grid_meter;
/// Uncontrolled household load.
pub mod household;
/// Simulated PV inverter.
pub mod pv_inverter;
/// Schedule-driven relay input board.
pub mod relay_board;
pub mod types;

pub use evcs_cluster::{SessionProfile, SimEvcsCluster};
pub use grid_meter::SimGridMeter;
pub use household::Household;
pub use pv_inverter::SimPvInverter;
pub use relay_board::{RelayBoard, RelayWindow};
pub use types::{Device, DeviceContext, EvcsCluster, GridMeter, PvInverter, RelaySource};

//! §14a EnWG restriction-mode controller for PV inverters and EV charging
//! clusters, with a simulation harness to drive it.

/// REST API over completed simulation runs.
#[cfg(feature = "api")]
pub mod api;
pub mod config;
/// Relay decoding, PV limit ramping and EVCS budget distribution.
pub mod control;
pub mod devices;
pub mod error;
pub mod io;
pub mod runner;
/// Simulation engine, clock, power balance and KPI modules.
pub mod sim;

/// Fixed-period scheduler clock.
pub mod clock;
pub mod engine;
pub mod kpi;
pub mod power_balance;
pub mod types;

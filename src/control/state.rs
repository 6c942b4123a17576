//! Cross-cycle controller state.

use super::production::ProductionLimitCalculator;

/// Ramp and smoothing history owned by one controller instance.
///
/// Reset on deactivation so a restart begins cold. The consumption budget
/// keeps no history.
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub production: ProductionLimitCalculator,
}

impl ControllerState {
    pub fn new(production_weights: Vec<f64>) -> Self {
        Self {
            production: ProductionLimitCalculator::new(production_weights),
        }
    }

    /// Last applied PV limit sum, `None` before the first limited cycle.
    pub fn pv_last_limit_sum(&self) -> Option<i32> {
        self.production.last_limit_sum()
    }

    pub fn little_diff_streak(&self) -> u32 {
        self.production.ramp().little_diff_streak()
    }

    pub fn reset(&mut self) {
        self.production.reset();
    }
}
